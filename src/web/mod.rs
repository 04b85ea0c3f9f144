pub mod analyze;
pub mod restart;
pub mod stream;
pub mod switch;

use crate::app_config::StreamConfig;
use crate::capture_config::FrameConfig;
use crate::core::source_selector::SourceSelector;
use crate::vision::gateway::AnalysisGateway;
use crate::web::restart::CaptureRestarter;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;

/// Shared state backing HTTP handlers. All singletons (selector, restarter,
/// analysis gateway, placeholder bytes) are constructed once at startup and
/// owned here; handlers never reach for globals.
#[derive(Clone)]
pub struct AppState {
    pub frame: FrameConfig,
    pub stream: StreamConfig,
    pub placeholder: Bytes,
    pub selector: Arc<SourceSelector>,
    pub restarter: Arc<dyn CaptureRestarter>,
    /// None when vision credentials are not configured; analysis requests
    /// are then rejected while streaming stays up.
    pub analyzer: Option<Arc<AnalysisGateway>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/video_feed", get(stream::video_feed))
        .route("/frame.jpg", get(stream::current_frame))
        .route("/switch_source", post(switch::switch_source))
        .route("/analyze", get(analyze::analyze_frame))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

/// Uniform error payload: `{"status": "error", "message": ...}`.
pub(crate) fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({
            "status": "error",
            "message": message,
        })),
    )
        .into_response()
}
