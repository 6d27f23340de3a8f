//! Environment-based configuration.
//!
//! Every setting has a default so the server starts with no environment at
//! all; values are read through a lookup function so tests never touch the
//! process environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use eyre::eyre;
use triage_engine::rank::DEFAULT_TOP_K;
use triage_model::embedding::{EmbeddingProvider, HttpEmbedder, MINILM_DIMENSION};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5002";
pub const DEFAULT_MODEL_DIR: &str = "models";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_EMBEDDING_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub model_dir: PathBuf,
    pub top_k: usize,
    pub request_timeout: Duration,
    /// Remote embedding endpoint for semantic bundles.
    pub embedding_url: Option<String>,
    pub embedding_timeout: Duration,
    pub embedding_dimension: usize,
    /// Local sentence-encoder directory. Takes precedence over
    /// `embedding_url` and needs the `local-embeddings` feature.
    pub local_embedding_dir: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl ServerConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = parse_or(var("TRIAGE_BIND_ADDR"), "TRIAGE_BIND_ADDR", || {
            DEFAULT_BIND_ADDR.parse()
        })?;
        let top_k = parse_or(var("TRIAGE_TOP_K"), "TRIAGE_TOP_K", || Ok(DEFAULT_TOP_K))?;
        if top_k == 0 {
            return Err(eyre!("TRIAGE_TOP_K must be at least 1"));
        }
        let request_timeout_ms = parse_or(
            var("TRIAGE_REQUEST_TIMEOUT_MS"),
            "TRIAGE_REQUEST_TIMEOUT_MS",
            || Ok(DEFAULT_REQUEST_TIMEOUT_MS),
        )?;
        let embedding_timeout_ms = parse_or(
            var("TRIAGE_EMBEDDING_TIMEOUT_MS"),
            "TRIAGE_EMBEDDING_TIMEOUT_MS",
            || Ok(DEFAULT_EMBEDDING_TIMEOUT_MS),
        )?;
        let embedding_dimension = parse_or(
            var("TRIAGE_EMBEDDING_DIMENSION"),
            "TRIAGE_EMBEDDING_DIMENSION",
            || Ok(MINILM_DIMENSION),
        )?;
        let log_format = match var("TRIAGE_LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => {
                return Err(eyre!(
                    "TRIAGE_LOG_FORMAT must be 'json' or 'pretty', got '{other}'"
                ));
            }
        };

        Ok(Self {
            bind_addr,
            model_dir: var("TRIAGE_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR)),
            top_k,
            request_timeout: Duration::from_millis(request_timeout_ms),
            embedding_url: var("TRIAGE_EMBEDDING_URL"),
            embedding_timeout: Duration::from_millis(embedding_timeout_ms),
            embedding_dimension,
            local_embedding_dir: var("TRIAGE_LOCAL_EMBEDDING_DIR").map(PathBuf::from),
            log_format,
        })
    }

    /// The embedding provider semantic bundles will use, if one is
    /// configured.
    pub fn embedding_provider(&self) -> eyre::Result<Option<Arc<dyn EmbeddingProvider>>> {
        match (&self.local_embedding_dir, &self.embedding_url) {
            (Some(dir), _) => local_embedder(dir).map(Some),
            (None, Some(url)) => Ok(Some(Arc::new(HttpEmbedder::new(
                url.clone(),
                self.embedding_dimension,
                self.embedding_timeout,
            )))),
            (None, None) => Ok(None),
        }
    }
}

fn parse_or<T>(
    value: Option<String>,
    key: &str,
    default: impl FnOnce() -> Result<T, T::Err>,
) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|e| eyre!("{key} has invalid value '{raw}': {e}")),
        None => default().map_err(|e| eyre!("invalid default for {key}: {e}")),
    }
}

#[cfg(feature = "local-embeddings")]
fn local_embedder(dir: &Path) -> eyre::Result<Arc<dyn EmbeddingProvider>> {
    use eyre::WrapErr;

    let embedder = triage_model::embedding::LocalEmbedder::load(dir)
        .wrap_err_with(|| format!("failed to load local embedder from {}", dir.display()))?;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "local-embeddings"))]
fn local_embedder(dir: &Path) -> eyre::Result<Arc<dyn EmbeddingProvider>> {
    Err(eyre!(
        "TRIAGE_LOCAL_EMBEDDING_DIR is set to {} but this build lacks the local-embeddings feature",
        dir.display()
    ))
}
