use crate::app_config::{ApplicationConfig, StreamConfig, VisionConfig};
use crate::capture_config::{CaptureConfig, FrameConfig};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::time::Instant;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MasterConfig {
    #[serde(rename = "application", default)]
    pub app_settings: ApplicationConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub vision: VisionConfig,
}

pub fn load_config(path: &str) -> Result<MasterConfig> {
    debug!("📄 Attempting to load config from: {}", path);
    let start_time = Instant::now();

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file '{}'. 📖", path))?;

    let config: MasterConfig = serde_yaml::from_str(&config_str)
        .with_context(|| format!("Failed to parse YAML configuration from '{}'. 💔", path))?;

    validate_master_config(&config).with_context(|| "Master configuration validation failed 👎")?;

    info!(
        "✅ Successfully loaded and validated configuration from '{}' in {:?}",
        path,
        start_time.elapsed()
    );
    Ok(config)
}

fn validate_master_config(config: &MasterConfig) -> Result<()> {
    debug!("🕵️ Validating master configuration...");

    if config.app_settings.listen_addr.parse::<SocketAddr>().is_err() {
        bail!(
            "❌ Invalid listen_addr '{}' (expected host:port).",
            config.app_settings.listen_addr
        );
    }

    if config.frame.width == 0 || config.frame.height == 0 {
        bail!(
            "❌ Frame dimensions must be non-zero (got {}x{}).",
            config.frame.width,
            config.frame.height
        );
    }
    if config.frame.buffer_path.as_os_str().is_empty() {
        bail!("❌ frame.buffer_path cannot be empty.");
    }

    if config.capture.selector_path.as_os_str().is_empty() {
        bail!("❌ capture.selector_path cannot be empty.");
    }
    if let Some(url) = &config.capture.rtsp_url {
        if !url.starts_with("rtsp://") {
            bail!("❌ capture.rtsp_url '{}' must start with rtsp://.", url);
        }
    }
    if config.capture.restart_command.is_empty() {
        bail!("❌ capture.restart_command cannot be empty.");
    }

    if config.stream.jpeg_quality > 100 {
        bail!(
            "❌ stream.jpeg_quality must be 0-100 (got {}).",
            config.stream.jpeg_quality
        );
    }
    if config.stream.frame_interval_ms == 0 {
        bail!("❌ stream.frame_interval_ms must be non-zero.");
    }

    if config.vision.analysis_timeout_secs == 0 {
        bail!("❌ vision.analysis_timeout_secs must be non-zero.");
    }
    if config.vision.target_labels.is_empty() {
        bail!("❌ vision.target_labels cannot be empty.");
    }

    debug!("👍 Master configuration validated successfully.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let file = write_config("application:\n  listen_addr: \"127.0.0.1:9000\"\n");
        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.app_settings.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.frame.width, 640);
        assert_eq!(config.frame.height, 480);
        assert_eq!(config.vision.target_labels, vec!["hat", "cap", "headwear"]);
    }

    #[test]
    fn rejects_bad_listen_addr() {
        let file = write_config("application:\n  listen_addr: \"not-an-addr\"\n");
        assert!(load_config(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn rejects_zero_frame_dimensions() {
        let file = write_config("frame:\n  width: 0\n  height: 480\n  buffer_path: /tmp/b\n");
        assert!(load_config(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn rejects_non_rtsp_url() {
        let file = write_config("capture:\n  device_index: 0\n  rtsp_url: \"http://wrong\"\n  selector_path: /tmp/s\n  reconnect_backoff_secs: 5\n  write_interval_ms: 10\n  io_timeout_secs: 10\n  restart_command: [\"true\"]\n");
        assert!(load_config(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn frame_len_matches_geometry() {
        let config = MasterConfig::default();
        assert_eq!(config.frame.frame_len(), 640 * 480 * 3);
    }
}
