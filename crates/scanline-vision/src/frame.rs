//! # Frame Buffer
//!
//! An addressable RGBA pixel buffer holding one copied video frame at the
//! stream's native resolution (not a down-scaled preview).
//!
//! The buffer is resized once per stream acquisition by the frame sampler;
//! after that, consecutive samples never observe a smaller buffer than the
//! negotiated resolution.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::{VisionError, VisionResult};

/// Bytes per RGBA pixel.
const BYTES_PER_PIXEL: usize = 4;

// =============================================================================
// Frame
// =============================================================================

/// One copied video frame: RGBA8 pixels plus a monotonically increasing
/// sample index assigned by the frame sampler.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    index: u64,
}

impl Frame {
    /// Creates a frame from raw RGBA pixels.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, index: u64) -> VisionResult<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(VisionError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Frame {
            width,
            height,
            pixels,
            index,
        })
    }

    /// Creates an empty zero-sized frame (buffer allocated on first resize).
    pub fn empty() -> Self {
        Frame::default()
    }

    /// Resizes the buffer to the given dimensions, zero-filling new space.
    ///
    /// Called once per stream acquisition, when the negotiated resolution
    /// becomes known.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels
            .resize(width as usize * height as usize * BYTES_PER_PIXEL, 0);
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Buffer dimensions as a pair.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sample index assigned by the frame sampler.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Sets the sample index.
    #[inline]
    pub fn set_index(&mut self, index: u64) {
        self.index = index;
    }

    /// Returns true when the frame has usable dimensions.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Read-only pixel access.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable pixel access for the device stream to copy into.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Converts the frame to a single-channel intensity image.
    pub fn to_gray(&self) -> VisionResult<GrayImage> {
        Ok(DynamicImage::ImageRgba8(self.to_rgba()?).to_luma8())
    }

    /// Converts the frame to an RGB image (JPEG has no alpha channel).
    pub fn to_rgb(&self) -> VisionResult<RgbImage> {
        Ok(DynamicImage::ImageRgba8(self.to_rgba()?).to_rgb8())
    }

    fn to_rgba(&self) -> VisionResult<RgbaImage> {
        let expected = self.width as usize * self.height as usize * BYTES_PER_PIXEL;
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            VisionError::BufferSize {
                expected,
                actual: self.pixels.len(),
            },
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_mismatched_buffer() {
        let err = Frame::new(vec![0u8; 10], 4, 4, 0).unwrap_err();
        assert!(matches!(err, VisionError::BufferSize { expected: 64, .. }));
    }

    #[test]
    fn test_resize_allocates_rgba_buffer() {
        let mut frame = Frame::empty();
        assert!(!frame.is_valid());

        frame.resize(8, 4);
        assert!(frame.is_valid());
        assert_eq!(frame.dimensions(), (8, 4));
        assert_eq!(frame.pixels().len(), 8 * 4 * 4);
    }

    #[test]
    fn test_to_gray_matches_dimensions() {
        let mut frame = Frame::empty();
        frame.resize(6, 3);
        let gray = frame.to_gray().unwrap();
        assert_eq!(gray.dimensions(), (6, 3));
    }

    #[test]
    fn test_index_roundtrip() {
        let mut frame = Frame::empty();
        frame.set_index(42);
        assert_eq!(frame.index(), 42);
    }
}
