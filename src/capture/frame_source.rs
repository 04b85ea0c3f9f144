use crate::core::source_selector::SourceKind;
use anyhow::Result;

/// One decoded capture, RGB8 row-major. Dimensions are whatever the source
/// produced; the supervisor normalizes to the configured geometry before the
/// frame reaches the shared buffer.
#[derive(Debug, Clone)]
pub struct Frame {
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgb.len() == self.width as usize * self.height as usize * 3
    }
}

/// A connected capture source. Implementations must not block indefinitely
/// in `grab`: network sources carry their own open/read timeouts, local
/// devices are assumed to fail fast.
pub trait FrameSource: Send {
    fn describe(&self) -> String;

    /// Acquire the next frame. Any error means the source is considered
    /// dead; the supervisor drops it and reconnects.
    fn grab(&mut self) -> Result<Frame>;
}

/// Factory for capture sources, keyed by the persisted source selection.
/// Injectable so supervisor tests can simulate flaky hardware.
pub trait SourceOpener: Send + Sync {
    fn open(&self, kind: SourceKind) -> Result<Box<dyn FrameSource>>;
}
