//! # Capture Error Types
//!
//! Error types for the capture pipeline.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Capture Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Device      │  │    Detection    │  │     Reconciliation      │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ PermissionDenied│  │  Transport      │  │  InventoryUnavailable   │ │
//! │  │ DeviceUnavail.  │  │  Service        │  │  InvalidBarcode         │ │
//! │  │ CapabilityUnsup.│  │  NoSymbol       │  │                         │ │
//! │  │ NotReady        │  │  Encode         │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────────────────────────────┐  │
//! │  │     Session     │  │              Configuration                  │  │
//! │  │                 │  │                                             │  │
//! │  │  StaleSession   │  │  InvalidConfig                              │  │
//! │  │                 │  │  ConfigLoadFailed                           │  │
//! │  └─────────────────┘  └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two variants never reach the user: `CapabilityUnsupported` only flips a
//! feature-availability flag, and `StaleSession` is swallowed
//! unconditionally. Nothing from this crate crosses the session controller
//! boundary into the owning form.

use thiserror::Error;

/// Result type alias for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Capture error type covering all pipeline failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum CaptureError {
    // =========================================================================
    // Device Errors
    // =========================================================================
    /// The user or platform denied camera access.
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    /// No usable camera device, or the device refused the constraints.
    #[error("Camera device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The active device does not expose a probed capability.
    /// Non-fatal: callers flip a feature flag and move on.
    #[error("Capability not supported by the active device: {0}")]
    CapabilityUnsupported(String),

    /// A frame was requested before the stream reported usable dimensions.
    #[error("Stream has not reported usable dimensions yet")]
    NotReady,

    // =========================================================================
    // Detection Errors
    // =========================================================================
    /// The remote detection collaborator was unreachable.
    #[error("Detection transport failed: {0}")]
    TransportError(String),

    /// The remote detection collaborator rejected the request.
    #[error("Detection service error: {0}")]
    ServiceError(String),

    /// The remote call succeeded but returned zero candidates.
    #[error("No barcode detected in the submitted frames")]
    NoSymbolDetected,

    /// A frame could not be encoded for submission.
    #[error("Frame encoding failed: {0}")]
    EncodeFailed(String),

    // =========================================================================
    // Reconciliation Errors
    // =========================================================================
    /// Both inventory lookup paths failed for non-not-found reasons.
    #[error("Inventory lookup unavailable: {0}")]
    InventoryUnavailable(String),

    /// A decoded value failed input validation before lookup.
    #[error("Rejected barcode value: {0}")]
    InvalidBarcode(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// A result arrived after the session was invalidated.
    /// Swallowed unconditionally, never surfaced. Calls that merely arrive
    /// in the wrong state are ignored by the controller, not errored.
    #[error("Result arrived after session invalidation")]
    StaleSession,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid capture configuration.
    #[error("Invalid capture configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<scanline_vision::VisionError> for CaptureError {
    fn from(err: scanline_vision::VisionError) -> Self {
        CaptureError::EncodeFailed(err.to_string())
    }
}

impl From<scanline_core::ValidationError> for CaptureError {
    fn from(err: scanline_core::ValidationError) -> Self {
        CaptureError::InvalidBarcode(err.to_string())
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::ServiceError(format!("payload serialization: {}", err))
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CaptureError {
    fn from(err: toml::de::Error) -> Self {
        CaptureError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CaptureError {
    /// Returns true if this error should surface as a retryable inline
    /// message in the capture UI.
    ///
    /// ## Retryable Errors
    /// - Device acquisition failures (user can grant permission, re-plug)
    /// - Detection transport/service failures (network issues)
    /// - Zero-candidate detections (re-aim and re-scan)
    ///
    /// ## Non-Retryable Errors
    /// - Configuration errors
    /// - Rejected barcode values
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CaptureError::PermissionDenied(_)
                | CaptureError::DeviceUnavailable(_)
                | CaptureError::TransportError(_)
                | CaptureError::ServiceError(_)
                | CaptureError::NoSymbolDetected
                | CaptureError::InventoryUnavailable(_)
        )
    }

    /// Returns true if this error must be swallowed rather than surfaced.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            CaptureError::CapabilityUnsupported(_) | CaptureError::StaleSession
        )
    }

    /// Returns true if this error came from the camera device layer.
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            CaptureError::PermissionDenied(_)
                | CaptureError::DeviceUnavailable(_)
                | CaptureError::CapabilityUnsupported(_)
                | CaptureError::NotReady
        )
    }
}
