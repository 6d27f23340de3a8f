//! triage-model
//!
//! Trained-model collaborators of the inference pipeline: the opaque
//! [`classifier::Classifier`] contract and its concrete forest and linear
//! implementations, the on-disk model bundle format, and sentence-embedding
//! providers for semantic encoding.

pub mod bundle;
pub mod classifier;
pub mod embedding;
pub mod error;
pub mod forest;
pub mod linear;
