//! Decoded frame representation and JPEG encoding.

use bytes::Bytes;
use thiserror::Error;

/// A single decoded grayscale frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Row-major luma pixels, one byte per pixel.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }
}

/// Error type for frame encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("frame dimensions {width}x{height} do not match {len} pixels")]
    BadDimensions { width: u32, height: u32, len: usize },
    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Encode a grayscale frame as JPEG.
///
/// The encode runs on the caller's thread; callers must invoke it outside
/// any frame-buffer lock so readers are never blocked during compression.
pub fn encode_gray_jpeg(frame: &Frame, quality: u8) -> Result<Bytes, EncodeError> {
    let img: image::GrayImage =
        image::ImageBuffer::from_raw(frame.width, frame.height, frame.pixels.clone()).ok_or(
            EncodeError::BadDimensions {
                width: frame.width,
                height: frame.height,
                len: frame.pixels.len(),
            },
        )?;

    let mut jpeg = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality);
    encoder.encode_image(&img)?;

    Ok(Bytes::from(jpeg))
}
