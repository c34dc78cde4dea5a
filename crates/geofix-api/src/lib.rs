//! GeoFix Read API
//!
//! HTTP/JSON read surface over the persisted fixes, consumed by the
//! tracking dashboard. Two endpoints:
//!
//! - `GET /api/location` - latest fix, formatted for display
//! - `GET /api/location/history?start=..&end=..` - inclusive range,
//!   ascending by datetime
//!
//! This crate only reads; it depends on the store's schema but never on
//! its write path. When storage is empty or unreachable the API degrades
//! to a sentinel payload instead of a raw error, so the dashboard can
//! render a waiting state without special-casing failures (see
//! [`models::NO_FIX_SENTINEL`]).

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use geofix_store::FixStore;

pub mod handlers;
pub mod models;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FixStore>,
}

/// Create the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/location", get(handlers::location::get_location))
        .route(
            "/api/location/history",
            get(handlers::location::get_history),
        )
        // Consumed from a browser dashboard on another origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
