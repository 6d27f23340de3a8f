use std::path::Path;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::info;

use super::EmbeddingProvider;
use crate::error::EmbeddingError;

/// The only `config.json` field needed outside of candle's own parsing.
#[derive(Deserialize)]
struct HiddenSize {
    hidden_size: usize,
}

/// In-process BERT sentence encoder (all-MiniLM-L6-v2 layout) running on
/// CPU through candle.
///
/// `model_dir` must contain `config.json`, `tokenizer.json` and
/// `model.safetensors`. Output is the attention-masked mean of the last
/// hidden state, L2-normalized, matching sentence-transformers.
pub struct LocalEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

fn model_err(e: impl std::fmt::Display) -> EmbeddingError {
    EmbeddingError::Model(e.to_string())
}

impl LocalEmbedder {
    pub fn load(model_dir: &Path) -> Result<Self, EmbeddingError> {
        let device = Device::Cpu;

        let config_json = std::fs::read_to_string(model_dir.join("config.json"))
            .map_err(|e| model_err(format!("config.json: {e}")))?;
        let config: Config = serde_json::from_str(&config_json).map_err(model_err)?;
        let HiddenSize { hidden_size } =
            serde_json::from_str(&config_json).map_err(model_err)?;

        let tokenizer = Tokenizer::from_file(model_dir.join("tokenizer.json"))
            .map_err(|e| model_err(format!("tokenizer.json: {e}")))?;

        let weights = model_dir.join("model.safetensors");
        // SAFETY: the weights file is memory-mapped read-only and is not
        // modified while the process runs.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DTYPE, &device) }
            .map_err(model_err)?;
        let model = BertModel::load(vb, &config).map_err(model_err)?;

        info!(dir = %model_dir.display(), dimension = hidden_size, "local embedding model loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            dimension: hidden_size,
        })
    }

    fn infer(&self, text: &str) -> candle_core::Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(candle_core::Error::msg)?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        // [1, seq_len, hidden]
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let mask = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;

        let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        let normalized = pooled.broadcast_div(&norm)?;

        normalized.squeeze(0)?.to_vec1::<f32>()
    }
}

impl EmbeddingProvider for LocalEmbedder {
    fn name(&self) -> &str {
        "local"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let vector = self.infer(text).map_err(model_err)?;
        if vector.len() != self.dimension {
            return Err(EmbeddingError::Dimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}
