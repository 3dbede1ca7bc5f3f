//! MJPEG multipart framing.
//!
//! Each frame becomes one part of a `multipart/x-mixed-replace` body.
//! Browsers replace the previous image on every part, which gives
//! continuous video from a plain `<img>` tag with no client-side code.

use bytes::Bytes;

/// Boundary separating MJPEG parts.
/// Must be unique enough to not appear in JPEG data.
pub const BOUNDARY: &str = "feed_frame_boundary";

/// `Content-Type` value for an MJPEG stream response.
pub fn content_type() -> String {
    format!("multipart/x-mixed-replace; boundary={BOUNDARY}")
}

/// Wrap one JPEG image as a multipart part.
pub fn part(jpeg: &[u8]) -> Bytes {
    let header = format!(
        "--{BOUNDARY}\r\n\
         Content-Type: image/jpeg\r\n\
         Content-Length: {len}\r\n\
         \r\n",
        len = jpeg.len()
    );

    let mut bytes = Vec::with_capacity(header.len() + jpeg.len() + 2);
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(jpeg);
    bytes.extend_from_slice(b"\r\n");

    Bytes::from(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_carries_boundary() {
        let value = content_type();
        assert!(value.starts_with("multipart/x-mixed-replace"));
        assert!(value.contains(BOUNDARY));
    }

    #[test]
    fn test_part_framing() {
        let payload = b"\xFF\xD8jpegdata";
        let part = part(payload);

        let text = String::from_utf8_lossy(&part);
        assert!(text.starts_with(&format!("--{BOUNDARY}\r\n")));
        assert!(text.contains("Content-Type: image/jpeg\r\n"));
        assert!(text.contains(&format!("Content-Length: {}\r\n", payload.len())));
        assert!(part.ends_with(b"\r\n"));

        // The payload sits between the blank line and the trailing CRLF.
        let header_end = part
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("header terminator present")
            + 4;
        assert_eq!(&part[header_end..header_end + payload.len()], payload);
    }
}
