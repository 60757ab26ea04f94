//! # scanline-vision: Pixel-Level Work
//!
//! Frame buffers, the geometric barcode-region heuristic, and payload
//! encoding for the remote detection collaborator.
//!
//! ## Processing Chain (continuous scan mode)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Region Heuristic Chain                              │
//! │                                                                         │
//! │  Frame (RGBA) ─► grayscale ─► Gaussian blur ─► adaptive threshold      │
//! │       ─► Canny edges ─► contours ─► min-area rotated rect              │
//! │       ─► area ≥ 1000 px² AND 2.5 ≤ long/short ≤ 8.0                    │
//! │       ─► CandidateRegion                                               │
//! │                                                                         │
//! │  No symbol decoding happens here: the chain answers "is a              │
//! │  barcode-shaped region present", nothing more.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`frame`] - RGBA pixel buffer sized to the native stream resolution
//! - [`regions`] - the contour/aspect-ratio candidate detector
//! - [`encode`] - JPEG + base64 data-URL payloads

pub mod encode;
pub mod frame;
pub mod regions;

pub use encode::{encode_frame_jpeg, normalize_payload, DATA_URL_PREFIX};
pub use frame::Frame;
pub use regions::{CandidateRegion, RegionAnalyzer, RegionParams};

use thiserror::Error;

/// Errors produced by pixel-level operations.
#[derive(Debug, Error)]
pub enum VisionError {
    /// A pixel buffer does not match the dimensions it claims.
    #[error("pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// JPEG encoding failed.
    #[error("frame encoding failed: {0}")]
    Encode(String),
}

/// Result type alias for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;
