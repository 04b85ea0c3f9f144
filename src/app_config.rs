use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApplicationConfig {
    pub listen_addr: String,
    pub placeholder_image: String, // path to the JPEG served while the buffer is absent
    pub log_level: Option<String>, // Making it optional to potentially use CLI as primary
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        ApplicationConfig {
            listen_addr: "0.0.0.0:8000".to_string(),
            placeholder_image: "static/camera_unavailable.jpg".to_string(),
            log_level: Some("info".to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    pub frame_interval_ms: u64,     // pacing between multipart parts, ~30fps ceiling
    pub placeholder_retry_secs: u64, // how often to re-attempt buffer attachment
    pub jpeg_quality: u8,           // 0-100
}

impl StreamConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn placeholder_retry(&self) -> Duration {
        Duration::from_secs(self.placeholder_retry_secs)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            frame_interval_ms: 33,
            placeholder_retry_secs: 1,
            jpeg_quality: 80,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct VisionConfig {
    pub analysis_timeout_secs: u64,
    pub request_timeout_secs: u64, // outbound HTTP timeout for the vision client
    pub target_labels: Vec<String>, // labels counted as "hat" hits, case-insensitive
}

impl VisionConfig {
    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        VisionConfig {
            analysis_timeout_secs: 20,
            request_timeout_secs: 15,
            target_labels: vec![
                "hat".to_string(),
                "cap".to_string(),
                "headwear".to_string(),
            ],
        }
    }
}
