//! # VC Data Model Evaluation
//!
//! `POST /w3c/vc-data-model?project=<label>&semantics=<bool>` evaluates the
//! request body as a credential and returns the flattened summary. When a
//! reporting sink is configured, the full report is published in the
//! background; publication failures are logged and never reach the caller.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use vcts_core::Document;
use vcts_report::{allure, AllureSink, Report};
use vcts_suite::{Evaluation, DEFAULT_PROJECT};

use crate::error::AppError;
use crate::state::AppState;

/// Query parameters of the evaluation endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EvaluateParams {
    /// Reporting project label. Defaults to `vc-data-model`.
    pub project: Option<String>,
    /// Run JSON-LD semantic analysis of the declared contexts.
    pub semantics: Option<bool>,
}

/// Evaluation result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EvaluationResponse {
    /// `{subSuiteName: [{statement, outcome}]}`.
    #[schema(value_type = Object)]
    pub vc_data_model: Value,
    /// Semantic verdict, present when semantics were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub semantics: Option<Value>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/w3c/vc-data-model", post(evaluate_vc_data_model))
}

/// Evaluate a credential against the VC Data Model 2.0.
#[utoipa::path(
    post,
    path = "/w3c/vc-data-model",
    params(EvaluateParams),
    request_body(content = Object, description = "The credential under test"),
    responses(
        (status = 200, description = "Evaluation summary", body = EvaluationResponse),
        (status = 400, description = "Body is not a JSON object", body = crate::error::ErrorBody),
    ),
    tag = "w3c"
)]
pub async fn evaluate_vc_data_model(
    State(state): State<AppState>,
    Query(params): Query<EvaluateParams>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EvaluationResponse>, AppError> {
    let Json(body) = body.map_err(|err| AppError::BadRequest(err.body_text()))?;
    let document = Document::from_value(body)?;
    let project = params
        .project
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PROJECT.to_string());
    let with_semantics = params.semantics.unwrap_or(false);

    let mut evaluation = Evaluation::new(document).with_project(project.clone());
    if with_semantics {
        evaluation = evaluation.with_semantics(state.semantics.clone());
    }
    let completed = evaluation.evaluate().await?;

    let vc_data_model = serde_json::to_value(completed.summary())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let semantics = if with_semantics {
        Some(serde_json::to_value(&completed.semantics).map_err(|e| AppError::Internal(e.to_string()))?)
    } else {
        None
    };

    if let Some(sink) = state.sink.clone() {
        spawn_publish(sink, project, completed.into_report());
    }

    Ok(Json(EvaluationResponse {
        vc_data_model,
        semantics,
    }))
}

fn spawn_publish(sink: AllureSink, project: String, report: Report) {
    tokio::spawn(async move {
        let files = allure::export(&report);
        if let Err(err) = sink.publish(&project, &files).await {
            tracing::warn!(project = %project, error = %err, "report publication failed");
        }
    });
}
