//! # vcts-api — Axum HTTP Front End
//!
//! Serves the conformance engine over HTTP.
//!
//! ## Routes
//!
//! - `POST /w3c/vc-data-model`: evaluate a credential
//! - `GET /server/status`: liveness check, `{"status": "ok"}`
//! - `GET /openapi.json`: generated OpenAPI document
//!
//! ## Middleware Stack (Tower)
//!
//! TraceLayer → CorsLayer
//!
//! ## Crate Policy
//!
//! - No evaluation logic in route handlers; they delegate to `vcts-suite`.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::AppState;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::vc_data_model::router())
        .merge(routes::status::router())
        .merge(openapi::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
