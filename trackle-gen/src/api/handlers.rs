//! Request handlers for the trigger endpoints

use super::AppState;
use crate::error::Error;
use crate::model::Trigger;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "trackle-gen",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.port,
        "modes": state.pipeline.modes().iter().map(|m| m.name.clone()).collect::<Vec<_>>(),
    }))
}

/// Reset request body
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    /// Mode to reset; required
    pub mode: String,
    /// Target date `YYYY-MM-DD`; defaults to tomorrow (UTC)
    #[serde(default)]
    pub date: Option<String>,
    /// Audit-only trigger source, `cron` or `manual`; defaults to manual.
    /// `recovery` is reserved for the verification sweep and rejected here.
    #[serde(default)]
    pub triggered_by: Option<Trigger>,
}

/// Run the reset pipeline for one mode
pub async fn reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ResetRequest>,
) -> Response {
    if let Err(response) = authorize(&headers, &state.shared_secret) {
        return response;
    }

    let date = match target_date(request.date.as_deref()) {
        Ok(date) => date,
        Err(response) => return response,
    };
    let trigger = request.triggered_by.unwrap_or(Trigger::Manual);
    if trigger == Trigger::Recovery {
        return error_response(Error::BadRequest(
            "triggered_by must be cron or manual".to_string(),
        ));
    }

    match state.pipeline.run_reset(&request.mode, date, trigger).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Verify request body (all fields optional)
#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    /// Target date `YYYY-MM-DD`; defaults to tomorrow (UTC)
    #[serde(default)]
    pub date: Option<String>,
}

/// Run the verification and recovery sweep
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<VerifyRequest>>,
) -> Response {
    if let Err(response) = authorize(&headers, &state.shared_secret) {
        return response;
    }

    let request = body.map(|Json(r)| r).unwrap_or_default();
    let date = match target_date(request.date.as_deref()) {
        Ok(date) => date,
        Err(response) => return response,
    };

    let report = state.pipeline.run_sweep(date).await;
    (StatusCode::OK, Json(report)).into_response()
}

/// Byte-for-byte bearer token check
///
/// Rejection happens before any pipeline work and is deliberately not
/// written to the execution log.
fn authorize(headers: &HeaderMap, shared_secret: &str) -> Result<(), Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if token.as_bytes() == shared_secret.as_bytes() => Ok(()),
        _ => {
            warn!("Rejected trigger request with missing or invalid bearer token");
            Err(error_response(Error::Authorization))
        }
    }
}

fn target_date(date: Option<&str>) -> Result<NaiveDate, Response> {
    match date {
        None => Ok(trackle_common::time::tomorrow_utc()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            error_response(Error::BadRequest(format!(
                "Invalid date {:?}, expected YYYY-MM-DD",
                s
            )))
        }),
    }
}

/// Map pipeline errors onto HTTP statuses with a structured body
fn error_response(e: Error) -> Response {
    let status = match &e {
        Error::Authorization => StatusCode::UNAUTHORIZED,
        Error::UnknownMode(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        Error::SourceNotFound { .. } => StatusCode::NOT_FOUND,
        Error::FrameLocation { .. }
        | Error::SliceBounds { .. }
        | Error::DurationUnresolved(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = json!({
        "success": false,
        "error": e.to_string(),
    });
    (status, Json(body)).into_response()
}
