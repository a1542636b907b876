//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document,
//! served at `/openapi.json` with the configured project title and version.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "VC Test-suite",
        version = "v0",
        description = "Conformance evaluation of credentials against the W3C Verifiable Credentials Data Model 2.0."
    ),
    paths(
        crate::routes::vc_data_model::evaluate_vc_data_model,
        crate::routes::status::server_status,
    ),
    components(schemas(
        crate::routes::vc_data_model::EvaluationResponse,
        crate::routes::status::ServerStatus,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "w3c", description = "W3C test suites"),
        (name = "server", description = "Server status"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json(State(state): State<AppState>) -> Json<utoipa::openapi::OpenApi> {
    let mut doc = ApiDoc::openapi();
    doc.info.title = state.settings.project_title.clone();
    doc.info.version = state.settings.project_version.clone();
    Json(doc)
}
