//! # Frame Payload Encoding
//!
//! JPEG + base64 data-URL payloads for the remote detection collaborator.
//!
//! The collaborator accepts `data:image/jpeg;base64,...` strings; the
//! encoder always emits the prefix, and [`normalize_payload`] guards the
//! boundary so a payload is never double-prefixed regardless of which
//! caller produced it.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;

use crate::frame::Frame;
use crate::{VisionError, VisionResult};

/// Data-URL prefix every submitted payload carries.
pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Encodes a frame as a JPEG data URL at the given quality (1-100).
pub fn encode_frame_jpeg(frame: &Frame, quality: u8) -> VisionResult<String> {
    if !frame.is_valid() {
        return Err(VisionError::Encode(
            "frame has no usable dimensions".to_string(),
        ));
    }
    let rgb = frame.to_rgb()?;

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| VisionError::Encode(e.to_string()))?;

    let mut payload = String::with_capacity(DATA_URL_PREFIX.len() + jpeg.len() * 4 / 3 + 4);
    payload.push_str(DATA_URL_PREFIX);
    payload.push_str(&BASE64.encode(&jpeg));
    Ok(payload)
}

/// Ensures a payload carries exactly one data-URL prefix.
pub fn normalize_payload(payload: &str) -> String {
    if payload.starts_with("data:image") {
        payload.to_string()
    } else {
        format!("{}{}", DATA_URL_PREFIX, payload)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_payload_is_a_data_url() {
        let mut frame = Frame::empty();
        frame.resize(16, 16);

        let payload = encode_frame_jpeg(&frame, 95).unwrap();
        assert!(payload.starts_with(DATA_URL_PREFIX));
        // The remainder must be valid base64.
        let body = &payload[DATA_URL_PREFIX.len()..];
        assert!(BASE64.decode(body).is_ok());
    }

    #[test]
    fn test_encode_rejects_empty_frame() {
        // Zero-sized frames cannot be encoded; callers sample first.
        let frame = Frame::empty();
        assert!(encode_frame_jpeg(&frame, 95).is_err());
    }

    #[test]
    fn test_normalize_adds_missing_prefix() {
        assert_eq!(
            normalize_payload("AAAA"),
            format!("{}AAAA", DATA_URL_PREFIX)
        );
    }

    #[test]
    fn test_normalize_never_double_prefixes() {
        let payload = format!("{}AAAA", DATA_URL_PREFIX);
        assert_eq!(normalize_payload(&payload), payload);
    }
}
