//! Axum handlers for the `/api/thread` endpoints.
//!
//! Both handlers are thin wrappers over [`ThreadAssembler`](threadcast_core::ThreadAssembler).
//! Body rejections are mapped to 400 so every failure shares the JSON error
//! shape.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use threadcast_core::ThreadPayload;

use crate::error::HttpError;
use crate::state::AppState;

// ── Request body shapes ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ThreadUrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ThreadTextRequest {
    pub text: String,
}

fn body<T>(request: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    request
        .map(|Json(inner)| inner)
        .map_err(|rejection| HttpError::BadRequest(rejection.body_text()))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// `POST /api/thread`
pub async fn from_url(
    State(state): State<AppState>,
    request: Result<Json<ThreadUrlRequest>, JsonRejection>,
) -> Result<Json<ThreadPayload>, HttpError> {
    let request = body(request)?;
    let payload = state.assembler.assemble_url(&request.url).await?;
    if let Some(warning) = &payload.warning {
        tracing::info!(warning = %warning, "Returning degraded thread");
    }
    Ok(Json(payload))
}

/// `POST /api/thread/text`
///
/// Blank text is rejected; the pasted-text path is a disabled action then.
pub async fn from_text(
    State(state): State<AppState>,
    request: Result<Json<ThreadTextRequest>, JsonRejection>,
) -> Result<Json<ThreadPayload>, HttpError> {
    let request = body(request)?;
    if request.text.trim().is_empty() {
        return Err(HttpError::BadRequest("text must not be blank".to_string()));
    }
    Ok(Json(state.assembler.assemble_text(&request.text)))
}
