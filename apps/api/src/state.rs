use std::sync::Arc;

use crate::config::Config;
use crate::enhance::orchestrator::Orchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The enhancement pipeline, built once at startup over the configured
    /// capability backends (live or offline).
    pub orchestrator: Arc<Orchestrator>,
}
