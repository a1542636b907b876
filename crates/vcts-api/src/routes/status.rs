//! Server status check.

use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Body of `GET /server/status`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerStatus {
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/server/status", get(server_status))
}

/// Report that the server is up.
#[utoipa::path(
    get,
    path = "/server/status",
    responses(
        (status = 200, description = "Server is running", body = ServerStatus),
    ),
    tag = "server"
)]
pub async fn server_status() -> Json<ServerStatus> {
    Json(ServerStatus {
        status: "ok".to_string(),
    })
}
