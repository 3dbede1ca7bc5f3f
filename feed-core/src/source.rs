//! Frame sources: the decode capability behind the producer loop.
//!
//! A source wraps one video location and hands out decoded frames in
//! presentation order. Decoding internals stay behind this trait; the
//! producer only ever pulls, checks for end-of-stream, and rewinds.

use thiserror::Error;

use crate::frame::Frame;

#[cfg(feature = "opencv")]
mod video;
#[cfg(feature = "opencv")]
pub use video::VideoFileSource;

/// Error type for source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open video source {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Pull-based access to one video location.
///
/// Every `next_frame` call advances the internal decode position; no
/// frame is returned twice without an intervening `rewind`.
pub trait FrameSource {
    /// Decode the next frame, or `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;

    /// Reset the decode position to the first frame.
    fn rewind(&mut self) -> Result<(), SourceError>;

    /// Native frame rate, if the source reports one.
    fn frame_rate(&self) -> Option<f64> {
        None
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        (**self).next_frame()
    }

    fn rewind(&mut self) -> Result<(), SourceError> {
        (**self).rewind()
    }

    fn frame_rate(&self) -> Option<f64> {
        (**self).frame_rate()
    }
}

/// Deterministic procedural source.
///
/// Used when no video backend is compiled in, and by tests that need
/// scripted end-of-stream behavior. Frames carry a bright bar that moves
/// with the frame index over a base shade derived from `seed`, so
/// consecutive frames and distinct locations are visually told apart.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frame_count: u32,
    position: u32,
    seed: u8,
    fps: f64,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32, frame_count: u32, seed: u8) -> Self {
        Self {
            width,
            height,
            frame_count,
            position: 0,
            seed,
            fps: crate::producer::FALLBACK_FPS,
        }
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    fn render(&self, index: u32) -> Frame {
        let mut pixels = vec![0u8; (self.width * self.height) as usize];
        let bar = index % self.width.max(1);
        for y in 0..self.height {
            for x in 0..self.width {
                let value = if x == bar {
                    255
                } else {
                    self.seed.wrapping_add(((x + y) % 64) as u8)
                };
                pixels[(y * self.width + x) as usize] = value;
            }
        }
        Frame::new(pixels, self.width, self.height)
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.position >= self.frame_count {
            return Ok(None);
        }
        let frame = self.render(self.position);
        self.position += 1;
        Ok(Some(frame))
    }

    fn rewind(&mut self) -> Result<(), SourceError> {
        self.position = 0;
        Ok(())
    }

    fn frame_rate(&self) -> Option<f64> {
        Some(self.fps)
    }
}
