use std::sync::Arc;
use std::time::Duration;

use triage_engine::pipeline::Pipeline;
use triage_engine::router::{ModelRegistry, RegistryHandle};

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RegistryHandle>,
    pub pipeline: Pipeline,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(registry: ModelRegistry, pipeline: Pipeline, request_timeout: Duration) -> Self {
        Self {
            registry: Arc::new(RegistryHandle::new(registry)),
            pipeline,
            request_timeout,
        }
    }
}
