use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::EmbeddingProvider;
use crate::error::EmbeddingError;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embedding provider backed by a remote HTTP service.
///
/// Protocol: `POST {url}` with `{"input": "<text>"}`, answered by
/// `{"embedding": [f32, ...]}`. Every request is bounded by a global
/// timeout covering connect, send, and body read.
pub struct HttpEmbedder {
    agent: ureq::Agent,
    url: String,
    dimension: usize,
}

impl HttpEmbedder {
    pub fn new(url: impl Into<String>, dimension: usize, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            url: url.into(),
            dimension,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EmbeddingProvider for HttpEmbedder {
    fn name(&self) -> &str {
        "http"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut response = self
            .agent
            .post(&self.url)
            .send_json(&EmbedRequest { input: text })
            .map_err(map_ureq_error)?;

        let body: EmbedResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| match e {
                ureq::Error::Timeout(_) => EmbeddingError::Timeout,
                other => EmbeddingError::Response(other.to_string()),
            })?;

        if body.embedding.len() != self.dimension {
            return Err(EmbeddingError::Dimension {
                expected: self.dimension,
                actual: body.embedding.len(),
            });
        }

        debug!(url = %self.url, dimension = self.dimension, "embedding received");
        Ok(body.embedding)
    }
}

fn map_ureq_error(e: ureq::Error) -> EmbeddingError {
    match e {
        ureq::Error::Timeout(_) => EmbeddingError::Timeout,
        other => EmbeddingError::Transport(other.to_string()),
    }
}
