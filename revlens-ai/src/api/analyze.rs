//! Analysis endpoint
//!
//! `POST /analyze` with the CSV table as the request body. Responds with the
//! serialized [`AnalysisRun`]. Schema and parse problems are 400, bodies over
//! the configured limit 413, classifier failures 502; a failed executive
//! report is still a 200 with a degraded report status.

use crate::models::AnalysisRun;
use crate::services::TableSource;
use crate::workflow::PipelineError;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::info;

/// POST /analyze
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<AnalysisRun>> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(format!("limit is {} bytes", state.body_limit))
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })?;

    if body.is_empty() {
        return Err(ApiError::BadRequest(
            "request body must be a CSV table with a 'review' column".to_string(),
        ));
    }

    info!(bytes = body.len(), "Analysis requested");

    match state.pipeline.run(&TableSource::Bytes(body.to_vec())).await {
        Ok(run) => {
            *state.last_error.write().await = None;
            Ok(Json(run))
        }
        Err(e) => {
            // input problems are the caller's; only service failures mark health
            if matches!(e, PipelineError::Classification(_)) {
                *state.last_error.write().await = Some(e.to_string());
            }
            Err(e.into())
        }
    }
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze))
}
