//! triage-core
//!
//! Pure domain types for the triage engine: demographics, symptom slots,
//! feature vectors, requests, and diagnosis results. No model or I/O
//! dependency; this is the shared vocabulary of every other crate.

pub mod error;
pub mod models;
