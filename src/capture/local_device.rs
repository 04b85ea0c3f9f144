use crate::capture::frame_source::{Frame, FrameSource};
use crate::capture::mat_to_rgb_frame;
use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use opencv::{core as opencv_core, prelude::*, videoio};

/// Local capture device (e.g. /dev/video0), opened through the V4L2 backend
/// for Linux stability. Local devices are assumed to fail fast rather than
/// block, so no explicit read timeout is configured here.
pub struct LocalDeviceSource {
    capture: videoio::VideoCapture,
    device_index: i32,
}

impl LocalDeviceSource {
    pub fn open(device_index: i32, width: u32, height: u32) -> Result<Self> {
        info!("📷 Opening local capture device {} via V4L2...", device_index);
        let mut capture = videoio::VideoCapture::new(device_index, videoio::CAP_V4L2)
            .with_context(|| format!("OpenCV: Failed to construct VideoCapture for device {}", device_index))?;

        if !capture
            .is_opened()
            .with_context(|| format!("OpenCV: is_opened check failed for device {}", device_index))?
        {
            return Err(anyhow!(
                "Could not open capture device {} - it might be disconnected, in use, or permissions are wrong",
                device_index
            ));
        }

        // Resolution/FPS are hints; a mismatched camera is normalized by the
        // supervisor before the frame reaches the buffer.
        for (prop, value, name) in [
            (videoio::CAP_PROP_FRAME_WIDTH, width as f64, "width"),
            (videoio::CAP_PROP_FRAME_HEIGHT, height as f64, "height"),
            (videoio::CAP_PROP_FPS, 30.0, "fps"),
        ] {
            if let Err(e) = capture.set(prop, value) {
                warn!("⚠️ Device {}: failed to set {} hint: {}", device_index, name, e);
            }
        }

        // Probe read: some devices report opened but cannot deliver frames.
        let mut probe = opencv_core::Mat::default();
        let got_probe = capture
            .read(&mut probe)
            .with_context(|| format!("OpenCV: Probe read failed for device {}", device_index))?;
        if !got_probe || probe.empty() {
            return Err(anyhow!(
                "Device {} opened but failed to deliver an initial frame. Releasing.",
                device_index
            ));
        }

        info!(
            "✅ Local device {} opened ({}x{} probe frame).",
            device_index,
            probe.cols(),
            probe.rows()
        );
        Ok(LocalDeviceSource {
            capture,
            device_index,
        })
    }
}

impl FrameSource for LocalDeviceSource {
    fn describe(&self) -> String {
        format!("local device {}", self.device_index)
    }

    fn grab(&mut self) -> Result<Frame> {
        let mut mat = opencv_core::Mat::default();
        let got = self
            .capture
            .read(&mut mat)
            .with_context(|| format!("OpenCV: Read failed for device {}", self.device_index))?;
        if !got {
            debug!("🚫 Device {}: read returned no frame.", self.device_index);
            return Err(anyhow!("Failed to grab frame from device {}", self.device_index));
        }
        mat_to_rgb_frame(&mat, &self.describe())
    }
}
