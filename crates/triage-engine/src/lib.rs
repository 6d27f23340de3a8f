//! triage-engine
//!
//! The synchronous inference pipeline: symptom normalization, feature
//! encoding, partition routing, classification, ranking, triage, and
//! response composition. Every stage returns a `Result`; [`pipeline::Pipeline`]
//! composes them and turns any failure into a structured result.

pub mod compose;
pub mod encode;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod router;
pub mod triage;
