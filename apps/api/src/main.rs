mod config;
mod enhance;
mod errors;
mod llm_client;
mod pdf;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::enhance::backend::{EvaluationBackend, GenerationBackend, LlmBackend, OfflineBackend};
use crate::enhance::orchestrator::Orchestrator;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Burnish API v{}", env!("CARGO_PKG_VERSION"));

    // Pick capability backends: live Claude client, or the degraded offline
    // variant when OFFLINE_MODE is set.
    let (generator, evaluator): (Arc<dyn GenerationBackend>, Arc<dyn EvaluationBackend>) =
        if config.offline_mode {
            info!("Offline mode enabled; capability calls use the local degraded backend");
            (Arc::new(OfflineBackend), Arc::new(OfflineBackend))
        } else {
            let llm = LlmClient::new(config.anthropic_api_key.clone());
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            let backend = Arc::new(LlmBackend::new(llm));
            (
                backend.clone() as Arc<dyn GenerationBackend>,
                backend as Arc<dyn EvaluationBackend>,
            )
        };

    // Build the enhancement pipeline
    let orchestrator = Arc::new(Orchestrator::new(
        generator,
        evaluator,
        config.agent_fan_out,
    ));
    info!("Orchestrator initialized (fan-out: {})", config.agent_fan_out);

    // Build app state
    let state = AppState {
        config: config.clone(),
        orchestrator,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
