//! Source switch protocol: validate, persist the selector, then ask the
//! process manager to restart the capture process. Asynchronous handoff by
//! design -- the 200 means the restart was requested, not that the new
//! source is streaming. Callers observe the effect through /video_feed.

use crate::core::source_selector::SourceKind;
use crate::web::{error_response, AppState};
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SwitchRequest {
    pub source: String,
}

/// POST /switch_source with a form field `source` = `local` | `rtsp`.
pub async fn switch_source(
    State(state): State<AppState>,
    Form(request): Form<SwitchRequest>,
) -> Response {
    let kind: SourceKind = match request.source.parse() {
        Ok(kind) => kind,
        Err(e) => {
            // Selector file stays untouched on invalid input.
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    if let Err(e) = state.selector.write(kind) {
        error!("❌ Failed to persist source selection '{}': {}", kind, e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    if let Err(e) = state.restarter.restart_capture().await {
        error!("❌ Capture restart request failed: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    info!("🎛️ Source switched to '{}'; capture restart requested.", kind);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "source": kind,
        })),
    )
        .into_response()
}
