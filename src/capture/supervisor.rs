//! The capture supervision loop: keep a live, correctly-shaped frame in the
//! shared buffer at all times, whatever the camera or network does.
//!
//! Single blocking loop, no internal concurrency. Structure:
//!
//!   select source -> connect -> stream frames -> (failure) -> select source
//!
//! Every reconnect attempt re-reads the source selector, so a selection
//! written while the camera was down takes effect without coordination.
//! Nothing here is fatal except the shutdown signal; connect failures wait
//! out a fixed backoff and try again forever.

use crate::capture::frame_source::{Frame, SourceOpener};
use crate::core::frame_buffer::FrameBufferWriter;
use crate::core::source_selector::SourceSelector;
use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::RgbImage;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Bound on how long a shutdown request can go unnoticed while sleeping.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    pub width: u32,
    pub height: u32,
    pub reconnect_backoff: Duration,
    pub write_interval: Duration,
}

pub struct CaptureSupervisor<O: SourceOpener> {
    opener: O,
    selector: SourceSelector,
    buffer_path: PathBuf,
    settings: SupervisorSettings,
    shutdown: Arc<AtomicBool>,
}

impl<O: SourceOpener> CaptureSupervisor<O> {
    pub fn new(
        opener: O,
        selector: SourceSelector,
        buffer_path: PathBuf,
        settings: SupervisorSettings,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        CaptureSupervisor {
            opener,
            selector,
            buffer_path,
            settings,
            shutdown,
        }
    }

    /// Run until the shutdown flag is raised. Creates the frame buffer on
    /// entry and unlinks it on the way out, so readers can treat buffer
    /// absence as "capture process not running".
    pub fn run(self) -> Result<()> {
        let frame_len = self.settings.width as usize * self.settings.height as usize * 3;
        let mut writer = FrameBufferWriter::create(&self.buffer_path, frame_len)
            .with_context(|| format!("Failed to create frame buffer at {}", self.buffer_path.display()))?;

        info!(
            "🎥 Capture supervisor started ({}x{}, buffer {}).",
            self.settings.width,
            self.settings.height,
            self.buffer_path.display()
        );

        'select_source: while !self.shutdown_requested() {
            let kind = self.selector.read();
            info!("🔌 Connecting to capture source '{}'...", kind);

            let mut source = match self.opener.open(kind) {
                Ok(source) => source,
                Err(e) => {
                    error!(
                        "❌ Failed to open source '{}': {:#}. Retrying in {:?}.",
                        kind, e, self.settings.reconnect_backoff
                    );
                    if self.wait_interruptible(self.settings.reconnect_backoff) {
                        break 'select_source;
                    }
                    // Re-read the selector: it may have changed while down.
                    continue 'select_source;
                }
            };

            info!("🎞️ Streaming from {}.", source.describe());
            while !self.shutdown_requested() {
                let frame = match source.grab() {
                    Ok(frame) if frame.is_well_formed() => frame,
                    Ok(frame) => {
                        warn!(
                            "👻 {} delivered a malformed frame ({}x{}, {} bytes). Reconnecting.",
                            source.describe(),
                            frame.width,
                            frame.height,
                            frame.rgb.len()
                        );
                        continue 'select_source;
                    }
                    Err(e) => {
                        warn!("🚫 Frame acquisition failed on {}: {:#}. Reconnecting.", source.describe(), e);
                        continue 'select_source;
                    }
                };

                match normalize_frame(frame, self.settings.width, self.settings.height) {
                    Some(normalized) => {
                        if let Err(e) = writer.write(&normalized) {
                            // Only reachable if normalization broke its contract.
                            error!("❌ Frame buffer write failed: {}. Reconnecting.", e);
                            continue 'select_source;
                        }
                    }
                    None => {
                        warn!("👻 Frame could not be normalized. Reconnecting.");
                        continue 'select_source;
                    }
                }

                // Pace writes to bound CPU/memory-bus usage.
                if self.wait_interruptible(self.settings.write_interval) {
                    break 'select_source;
                }
            }
        }

        info!("🏁 Capture supervisor shutting down; unlinking frame buffer.");
        writer
            .unlink()
            .with_context(|| format!("Failed to unlink frame buffer at {}", self.buffer_path.display()))?;
        Ok(())
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Sleep for `duration`, waking early if shutdown is requested.
    /// Returns true when shutdown was seen.
    fn wait_interruptible(&self, duration: Duration) -> bool {
        let mut remaining = duration;
        while !remaining.is_zero() {
            if self.shutdown_requested() {
                return true;
            }
            let slice = remaining.min(SHUTDOWN_POLL);
            std::thread::sleep(slice);
            remaining -= slice;
        }
        self.shutdown_requested()
    }
}

/// Bring a frame to the buffer geometry. A frame already at the target size
/// passes through untouched; anything else is hard-resized (aspect ratio is
/// not preserved). Returns None if the frame data cannot back an image of
/// its claimed dimensions.
pub(crate) fn normalize_frame(frame: Frame, width: u32, height: u32) -> Option<Vec<u8>> {
    if frame.width == width && frame.height == height {
        return Some(frame.rgb);
    }
    debug!(
        "📐 Resizing frame {}x{} -> {}x{}",
        frame.width, frame.height, width, height
    );
    let img = RgbImage::from_raw(frame.width, frame.height, frame.rgb)?;
    Some(image::imageops::resize(&img, width, height, FilterType::Triangle).into_raw())
}
