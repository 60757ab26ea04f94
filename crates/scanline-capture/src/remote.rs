//! # Remote Detection Client
//!
//! Encodes sampled frames and submits them to the external detection
//! collaborator.
//!
//! ## Submission Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Detection Submission                               │
//! │                                                                         │
//! │  detect_single(frame)                                                  │
//! │    frame ──► JPEG q95 ──► data URL ──► DetectionService::submit        │
//! │    ◄── zero or more DecodedSymbol                                      │
//! │                                                                         │
//! │  detect_batch(frames)                                                  │
//! │    ordered, strictly sequential per-frame submission                   │
//! │    ◄── at most ONE symbol: the highest confidence across the batch     │
//! │                                                                         │
//! │  NO internal retry. The caller decides whether to re-sample and        │
//! │  resubmit. In-flight calls are abandonable; the session drops stale    │
//! │  results on arrival.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Batching exists because a single hand-held frame is frequently blurred
//! or glared; aggregating several raises the odds of one confident read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use scanline_core::DecodedSymbol;
use scanline_vision::{encode_frame_jpeg, normalize_payload, Frame};

use crate::error::{CaptureError, CaptureResult};

// =============================================================================
// Wire Payloads
// =============================================================================

/// One encoded frame submitted for detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    /// `data:image/jpeg;base64,...` payload.
    pub image: String,
}

/// One barcode the collaborator decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedBarcode {
    /// Decoded symbol content.
    pub data: String,

    /// Detection confidence, when the collaborator reports one.
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Collaborator response for a single-frame submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    /// Whether the collaborator processed the frame.
    pub success: bool,

    /// Decoded candidates, possibly empty.
    #[serde(default)]
    pub barcodes: Vec<DetectedBarcode>,
}

impl DetectResponse {
    /// A successful response carrying the given candidates.
    pub fn with_barcodes(barcodes: Vec<DetectedBarcode>) -> Self {
        DetectResponse {
            success: true,
            barcodes,
        }
    }

    /// A successful response with zero candidates.
    pub fn empty() -> Self {
        DetectResponse {
            success: true,
            barcodes: Vec::new(),
        }
    }
}

// =============================================================================
// Detection Service Boundary
// =============================================================================

/// The opaque external detection collaborator.
///
/// The transport behind it is deliberately unspecified; implementations
/// fail with [`CaptureError::TransportError`] when unreachable and
/// [`CaptureError::ServiceError`] when the request is rejected.
#[async_trait]
pub trait DetectionService: Send + Sync {
    /// Submits one encoded frame.
    async fn submit(&self, request: DetectRequest) -> CaptureResult<DetectResponse>;
}

// =============================================================================
// Remote Detection Client
// =============================================================================

/// Encodes frames and drives the detection collaborator.
pub struct RemoteDetectionClient {
    service: Arc<dyn DetectionService>,
    jpeg_quality: u8,
}

impl RemoteDetectionClient {
    /// Creates a client over the given service.
    pub fn new(service: Arc<dyn DetectionService>, jpeg_quality: u8) -> Self {
        RemoteDetectionClient {
            service,
            jpeg_quality,
        }
    }

    /// Submits one frame; returns every symbol the collaborator decoded.
    pub async fn detect_single(&self, frame: &Frame) -> CaptureResult<Vec<DecodedSymbol>> {
        let payload = encode_frame_jpeg(frame, self.jpeg_quality)?;
        let request = DetectRequest {
            image: normalize_payload(&payload),
        };

        let response = self.service.submit(request).await?;
        if !response.success {
            return Err(CaptureError::ServiceError(
                "detection service rejected the frame".into(),
            ));
        }

        debug!(
            frame_index = frame.index(),
            candidates = response.barcodes.len(),
            "Detection response received"
        );

        Ok(response
            .barcodes
            .into_iter()
            .map(|b| {
                DecodedSymbol::new(
                    b.data,
                    b.confidence.unwrap_or(0.0) as f32,
                    frame.index(),
                )
            })
            .collect())
    }

    /// Submits an ordered sequence of frames and returns at most one
    /// symbol: the highest-confidence candidate across the whole batch.
    ///
    /// Frames are submitted strictly in order, one in flight at a time; a
    /// transport or service failure on any frame fails the whole batch
    /// (no internal retry).
    pub async fn detect_batch(&self, frames: &[Frame]) -> CaptureResult<Option<DecodedSymbol>> {
        let mut best: Option<DecodedSymbol> = None;

        for frame in frames {
            let symbols = self.detect_single(frame).await?;
            for symbol in symbols {
                let better = best
                    .as_ref()
                    .map_or(true, |b| symbol.confidence > b.confidence);
                if better {
                    best = Some(symbol);
                }
            }
        }

        if let Some(ref symbol) = best {
            debug!(
                value = %symbol.value,
                confidence = symbol.confidence,
                source_frame_index = symbol.source_frame_index,
                "Batch detection winner"
            );
        }
        Ok(best)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
