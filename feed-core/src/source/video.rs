//! OpenCV-backed video file decoding.

use std::path::Path;

use opencv::core::Mat;
use opencv::prelude::*;
use opencv::{imgproc, videoio};
use tracing::debug;

use super::{FrameSource, SourceError};
use crate::frame::Frame;

impl From<opencv::Error> for SourceError {
    fn from(err: opencv::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}

/// Decodes frames from an on-disk video file.
pub struct VideoFileSource {
    capture: videoio::VideoCapture,
    fps: Option<f64>,
}

impl VideoFileSource {
    /// Open a video file.
    ///
    /// Failure here is a configuration error; callers treat it as fatal
    /// at startup.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let display = path.display().to_string();
        let capture =
            videoio::VideoCapture::from_file(&display, videoio::CAP_ANY).map_err(|e| {
                SourceError::Open {
                    path: display.clone(),
                    reason: e.to_string(),
                }
            })?;
        let opened = capture.is_opened().map_err(|e| SourceError::Open {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        if !opened {
            return Err(SourceError::Open {
                path: display,
                reason: "not a readable video stream".into(),
            });
        }

        let fps = capture
            .get(videoio::CAP_PROP_FPS)
            .ok()
            .filter(|fps| fps.is_finite() && *fps > 0.0);
        debug!(path = %display, ?fps, "opened video source");

        Ok(Self { capture, fps })
    }
}

impl FrameSource for VideoFileSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let mut raw = Mat::default();
        if !self.capture.read(&mut raw)? {
            return Ok(None);
        }

        let mut gray = Mat::default();
        imgproc::cvt_color_def(&raw, &mut gray, imgproc::COLOR_BGR2GRAY)?;

        let width = gray.cols() as u32;
        let height = gray.rows() as u32;
        let pixels = gray.data_bytes()?.to_vec();

        Ok(Some(Frame::new(pixels, width, height)))
    }

    fn rewind(&mut self) -> Result<(), SourceError> {
        self.capture.set(videoio::CAP_PROP_POS_FRAMES, 0.0)?;
        Ok(())
    }

    fn frame_rate(&self) -> Option<f64> {
        self.fps
    }
}
