use crate::errors::AppError;
use crate::web::{error_response, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{info, warn};

/// GET /analyze -- snapshot the current frame and run one vision round trip
/// through the single-slot worker.
pub async fn analyze_frame(State(state): State<AppState>) -> Response {
    let Some(gateway) = &state.analyzer else {
        let e = AppError::VisionNotConfigured(
            "set VISION_ENDPOINT and VISION_KEY to enable analysis".to_string(),
        );
        warn!("⚠️ Analysis requested but {}", e);
        return error_response(status_for(&e), e.to_string());
    };

    match gateway.analyze_current_frame().await {
        Ok(analysis) => {
            info!(
                "✅ Analysis complete: {} object(s), {} target hit(s).",
                analysis.objects.len(),
                analysis.hat_objects.len()
            );
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "success",
                    "analysis_data": analysis,
                })),
            )
                .into_response()
        }
        Err(e) => {
            warn!("⚠️ Analysis request failed: {}", e);
            error_response(status_for(&e), e.to_string())
        }
    }
}

/// Distinct status per failure cause: buffer absent vs. empty frame vs.
/// timeout vs. remote-side or local error.
fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::BufferUnavailable(_) => StatusCode::NOT_FOUND,
        AppError::EmptyFrame(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        AppError::AnalysisTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn maps_error_taxonomy_to_distinct_statuses() {
        assert_eq!(
            status_for(&AppError::BufferUnavailable("gone".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&AppError::EmptyFrame("blank".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AppError::AnalysisTimeout(Duration::from_secs(20))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&AppError::Vision("remote".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&AppError::VisionNotConfigured("no key".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
