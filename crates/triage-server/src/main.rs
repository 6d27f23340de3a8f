use std::path::PathBuf;
use std::sync::Arc;

use eyre::WrapErr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use triage_engine::pipeline::{Pipeline, PipelineConfig};
use triage_engine::router::{ModelRegistry, RegistryHandle};
use triage_model::embedding::EmbeddingProvider;
use triage_server::config::{LogFormat, ServerConfig};
use triage_server::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = ServerConfig::from_env()?;
    init_tracing(config.log_format);

    let embedder = config.embedding_provider()?;
    let registry = ModelRegistry::load(&config.model_dir, embedder.clone())
        .wrap_err_with(|| format!("failed to load models from {}", config.model_dir.display()))?;

    let state = AppState::new(
        registry,
        Pipeline::new(PipelineConfig {
            top_k: config.top_k,
        }),
        config.request_timeout,
    );

    #[cfg(unix)]
    reload_on_hangup(
        Arc::clone(&state.registry),
        config.model_dir.clone(),
        embedder,
    )?;
    #[cfg(not(unix))]
    let _ = embedder;

    let app = triage_server::build_router(state);
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "triage server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("triage server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Rebuild the whole registry from disk on SIGHUP. A failed reload keeps
/// the models already being served.
#[cfg(unix)]
fn reload_on_hangup(
    handle: Arc<RegistryHandle>,
    model_dir: PathBuf,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
) -> eyre::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).wrap_err("failed to install SIGHUP handler")?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            tracing::info!(model_dir = %model_dir.display(), "reloading models");
            let dir = model_dir.clone();
            let embedder = embedder.clone();
            match tokio::task::spawn_blocking(move || ModelRegistry::load(&dir, embedder)).await {
                Ok(Ok(registry)) => {
                    handle.replace(registry);
                    tracing::info!("model registry reloaded");
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "model reload failed, keeping current models");
                }
                Err(e) => tracing::error!(error = %e, "model reload task failed"),
            }
        }
    });
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
