//! HTTP trigger surface
//!
//! The service is passive: an external scheduler (or an operator) hits
//! these endpoints. Both trigger endpoints require the shared secret as a
//! bearer token; a mismatch is rejected before any pipeline work happens
//! and leaves no execution log.

pub mod handlers;

use crate::pipeline::ResetPipeline;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The reset orchestrator
    pub pipeline: Arc<ResetPipeline>,
    /// Shared secret compared byte-for-byte against the bearer token
    pub shared_secret: String,
    /// Server port (reported by /health)
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/reset", post(handlers::reset))
        .route("/api/verify", post(handlers::verify))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
