//! triage-server library root.
//!
//! The HTTP surface of the triage engine. Modules are public so the
//! integration tests can build the router against fixture models without
//! binding a socket.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ai/diagnose", post(routes::diagnose::diagnose))
        .route("/ai/health", get(routes::health::health_check))
        .route("/ai/info", get(routes::info::model_info))
        .layer(axum_mw::from_fn(middleware::request_log::request_log))
        .layer(cors)
        .with_state(state)
}
