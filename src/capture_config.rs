use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const FRAME_CHANNELS: usize = 3; // RGB8

/// Geometry and location of the shared frame buffer. Both processes read
/// this section, so a single config file must be shared between them.
#[derive(Debug, Deserialize, Clone)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
    pub buffer_path: PathBuf,
}

impl FrameConfig {
    /// Size in bytes of one full frame, and of the shared buffer itself.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * FRAME_CHANNELS
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        FrameConfig {
            width: 640,
            height: 480,
            buffer_path: PathBuf::from("/dev/shm/camwatch_frame"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    pub device_index: i32,          // e.g. 0 for /dev/video0
    pub rtsp_url: Option<String>,   // required only when the selector says rtsp
    pub selector_path: PathBuf,     // persisted source selection, single token
    pub reconnect_backoff_secs: u64,
    pub write_interval_ms: u64,
    pub io_timeout_secs: u64,       // open/read bound for network sources
    pub restart_command: Vec<String>, // process-manager restart of the capture process
}

impl CaptureConfig {
    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }

    pub fn write_interval(&self) -> Duration {
        Duration::from_millis(self.write_interval_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            device_index: 0,
            rtsp_url: None,
            selector_path: PathBuf::from("/var/lib/camwatch/source"),
            reconnect_backoff_secs: 5,
            write_interval_ms: 10,
            io_timeout_secs: 10,
            restart_command: vec![
                "systemctl".to_string(),
                "restart".to_string(),
                "camwatch-capture.service".to_string(),
            ],
        }
    }
}
