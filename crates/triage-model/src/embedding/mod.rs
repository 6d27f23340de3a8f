//! Sentence-embedding providers used by semantic encoding.

mod http;
#[cfg(feature = "local-embeddings")]
mod local;

pub use http::HttpEmbedder;
#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;

use crate::error::EmbeddingError;

/// Dimension of all-MiniLM-L6-v2, the model the semantic bundles were
/// trained against.
pub const MINILM_DIMENSION: usize = 384;

/// Turns text into a fixed-length dense vector.
///
/// Calls may block on I/O or heavy compute; implementations are expected to
/// bound their own latency and report a timeout as
/// [`EmbeddingError::Timeout`] rather than hang.
pub trait EmbeddingProvider: Send + Sync {
    /// Short name for logs and metadata.
    fn name(&self) -> &str;

    /// Length of every vector returned by [`EmbeddingProvider::embed`].
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
