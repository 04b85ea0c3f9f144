pub mod frame_source;
pub mod local_device;
pub mod rtsp_source;
pub mod supervisor;

use crate::capture_config::CaptureConfig;
use crate::capture::frame_source::{Frame, FrameSource, SourceOpener};
use crate::core::source_selector::SourceKind;
use anyhow::{anyhow, Context, Result};
use opencv::{core as opencv_core, imgproc, prelude::*};

/// Production opener: local V4L2 device or RTSP stream, both via OpenCV.
pub struct OpenCvOpener {
    config: CaptureConfig,
    width: u32,
    height: u32,
}

impl OpenCvOpener {
    pub fn new(config: CaptureConfig, width: u32, height: u32) -> Self {
        OpenCvOpener {
            config,
            width,
            height,
        }
    }
}

impl SourceOpener for OpenCvOpener {
    fn open(&self, kind: SourceKind) -> Result<Box<dyn FrameSource>> {
        match kind {
            SourceKind::Local => {
                let source = local_device::LocalDeviceSource::open(
                    self.config.device_index,
                    self.width,
                    self.height,
                )?;
                Ok(Box::new(source))
            }
            SourceKind::Rtsp => {
                let url = self
                    .config
                    .rtsp_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("Source selector says rtsp, but capture.rtsp_url is not configured"))?;
                let source = rtsp_source::RtspSource::open(url, self.config.io_timeout())?;
                Ok(Box::new(source))
            }
        }
    }
}

/// Convert a BGR OpenCV Mat into an owned RGB8 frame. Shared by both source
/// implementations.
pub(crate) fn mat_to_rgb_frame(bgr: &opencv_core::Mat, source_name: &str) -> Result<Frame> {
    if bgr.empty() {
        return Err(anyhow!("OpenCV: Captured frame is empty for '{}'", source_name));
    }

    let mut rgb = opencv_core::Mat::default();
    imgproc::cvt_color(
        bgr,
        &mut rgb,
        imgproc::COLOR_BGR2RGB,
        0,
        opencv_core::AlgorithmHint::ALGO_HINT_DEFAULT,
    )
    .with_context(|| format!("OpenCV: BGR->RGB conversion failed for '{}'", source_name))?;

    let contiguous = if rgb.is_continuous() {
        rgb
    } else {
        rgb.try_clone()
            .with_context(|| format!("OpenCV: Failed to make frame contiguous for '{}'", source_name))?
    };

    let width = contiguous.cols() as u32;
    let height = contiguous.rows() as u32;
    let data = contiguous
        .data_bytes()
        .with_context(|| format!("OpenCV: Failed to access frame bytes for '{}'", source_name))?
        .to_vec();

    Ok(Frame {
        rgb: data,
        width,
        height,
    })
}
