//! # Kasir API
//!
//! HTTP JSON API for the Kasir point-of-sale backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Kasir API Server                               │
//! │                                                                         │
//! │  Cashier client ───► HTTP (8080) ───► routes ───► kasir-db ───► SQLite │
//! │                          │                          │                   │
//! │                      TraceLayer               kasir-core rules          │
//! │                                          (validation, pricing, stock)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`]: `KASIR_*` environment configuration
//! - [`error`]: [`ApiError`](error::ApiError) and the error-to-status mapping
//! - [`extract`]: extractors that reject with `ApiError`
//! - [`routes`]: handlers and the route table

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use axum::Router;
use tower_http::trace::TraceLayer;

use kasir_db::Database;

/// Shared application state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the application router with request tracing attached.
pub fn router(state: AppState) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
