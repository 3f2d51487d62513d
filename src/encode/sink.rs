use std::time::Duration;

use crate::foundation::error::ShorelineResult;
use crate::render::surface::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Display time of each frame.
    pub frame_delay: Duration,
}

/// Consumer of rendered frames in sequence order.
///
/// Ordering contract: `push_frame` is called with strictly increasing sequence positions.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ShorelineResult<()>;
    /// Push the frame rendered for sequence `position`.
    fn push_frame(&mut self, position: usize, frame: &FrameRGBA) -> ShorelineResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ShorelineResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(usize, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames with their sequence positions.
    pub fn frames(&self) -> &[(usize, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ShorelineResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, position: usize, frame: &FrameRGBA) -> ShorelineResult<()> {
        self.frames.push((position, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ShorelineResult<()> {
        self.ended = true;
        Ok(())
    }
}
