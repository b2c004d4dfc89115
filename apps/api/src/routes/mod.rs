pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::enhance::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes/enhance", post(handlers::handle_enhance))
        .with_state(state)
}
