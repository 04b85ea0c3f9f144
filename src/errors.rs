use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Camera buffer unavailable: {0}")]
    BufferUnavailable(String),

    #[error("No frame captured yet: {0}")]
    EmptyFrame(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Restart Error: {0}")]
    Restart(String),

    #[error("Vision API not configured: {0}")]
    VisionNotConfigured(String),

    #[error("Vision API Error: {0}")]
    Vision(String),

    #[error("Analysis timed out after {0:?}")]
    AnalysisTimeout(Duration),

    #[error("Image Processing Error: {0}")]
    Media(String),

    #[error("File I/O Error: {0}")]
    Io(String),
}

// Allow conversion from std::io::Error to AppError::Io
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}
