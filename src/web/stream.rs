//! Streaming gateway: serve each viewer an independent, continuously
//! refreshing MJPEG sequence read from the shared frame buffer.
//!
//! Each connection gets its own lazy, infinite stream. The buffer
//! attachment is made once and reused; every emitted part copies the
//! current bytes out first, since the capture process may rewrite the
//! region mid-encode (a torn frame decodes well enough and is superseded
//! by the next part). When the buffer is absent the stream degrades to the
//! fixed placeholder JPEG and keeps retrying attachment, so a capture
//! restart heals the feed without the viewer reconnecting.

use crate::common::jpeg_utils::encode_rgb_to_jpeg;
use crate::core::frame_buffer::{is_blank_frame, FrameBufferReader};
use crate::web::{error_response, AppState};
use async_stream::stream;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use log::{debug, warn};
use std::convert::Infallible;

const BOUNDARY: &str = "frame";
const MULTIPART_CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

/// GET /video_feed -- infinite multipart stream, one JPEG per part,
/// terminated only by client disconnect.
pub async fn video_feed(State(state): State<AppState>) -> Response {
    let frame_cfg = state.frame.clone();
    let stream_cfg = state.stream.clone();
    let placeholder = state.placeholder.clone();

    let body_stream = stream! {
        let mut reader: Option<FrameBufferReader> = None;
        loop {
            if reader.is_none() {
                reader = FrameBufferReader::attach(&frame_cfg.buffer_path, frame_cfg.frame_len()).ok();
                if reader.is_some() {
                    debug!("🔗 Viewer stream attached to frame buffer.");
                }
            }

            let snapshot = reader.as_ref().map(|r| r.snapshot());
            match snapshot {
                Some(Ok(raw)) => {
                    match encode_rgb_to_jpeg(&raw, frame_cfg.width, frame_cfg.height, stream_cfg.jpeg_quality) {
                        Ok(jpeg) => {
                            yield Ok::<Bytes, Infallible>(multipart_part(&jpeg));
                            tokio::time::sleep(stream_cfg.frame_interval()).await;
                        }
                        Err(e) => {
                            // Torn frames encode fine; this is a real defect.
                            warn!("⚠️ Failed to encode streamed frame: {}", e);
                            tokio::time::sleep(stream_cfg.frame_interval()).await;
                        }
                    }
                }
                Some(Err(_)) => {
                    // Buffer unlinked or recreated underneath us.
                    debug!("Frame buffer attachment went stale; falling back to placeholder.");
                    reader = None;
                }
                None => {
                    yield Ok::<Bytes, Infallible>(multipart_part(&placeholder));
                    tokio::time::sleep(stream_cfg.placeholder_retry()).await;
                }
            }
        }
    };

    (
        [
            (header::CONTENT_TYPE, MULTIPART_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(body_stream),
    )
        .into_response()
}

/// GET /frame.jpg -- single current frame, for viewers that poll instead of
/// holding a stream open.
pub async fn current_frame(State(state): State<AppState>) -> Response {
    let reader = match FrameBufferReader::attach(&state.frame.buffer_path, state.frame.frame_len()) {
        Ok(reader) => reader,
        Err(e) => {
            return error_response(StatusCode::NOT_FOUND, format!("Camera unavailable: {}", e));
        }
    };
    let raw = match reader.snapshot() {
        Ok(raw) => raw,
        Err(e) => {
            return error_response(StatusCode::NOT_FOUND, format!("Camera unavailable: {}", e));
        }
    };
    if is_blank_frame(&raw) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "No frame captured yet".to_string(),
        );
    }

    match encode_rgb_to_jpeg(&raw, state.frame.width, state.frame.height, state.stream.jpeg_quality) {
        Ok(jpeg) => (
            [
                (header::CONTENT_TYPE, "image/jpeg"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            jpeg,
        )
            .into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode frame: {}", e),
        ),
    }
}

/// Wrap one JPEG in a multipart boundary delimiter.
fn multipart_part(jpeg: &[u8]) -> Bytes {
    let mut part = Vec::with_capacity(jpeg.len() + 96);
    part.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    part.extend_from_slice(b"Content-Type: image/jpeg\r\n");
    part.extend_from_slice(format!("Content-Length: {}\r\n\r\n", jpeg.len()).as_bytes());
    part.extend_from_slice(jpeg);
    part.extend_from_slice(b"\r\n");
    Bytes::from(part)
}
