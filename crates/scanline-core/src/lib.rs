//! # scanline-core: Pure Domain Logic
//!
//! Domain types and rules for the barcode capture & reconciliation pipeline.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Scanline Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Inventory Client (TypeScript)                │   │
//! │  │    Add Product ──► Edit Product ──► POS Cart                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   scanline-capture (pipeline)                   │   │
//! │  │    camera stream, remote detection, reconciliation, session     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ scanline-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ debounce  │  │validation │  │   error   │  │   │
//! │  │   │ ScanResult│  │ Debounce  │  │  barcode  │  │  domain   │  │   │
//! │  │   │ Barcode   │  │  Window   │  │   rules   │  │  errors   │  │   │
//! │  │   │  Match    │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CAMERA • NO NETWORK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, DecodedSymbol, BarcodeMatch, ...)
//! - [`debounce`] - Repeat-detection suppression window
//! - [`validation`] - Barcode input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic given its inputs
//! 2. **No I/O**: Camera, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Injected Clocks**: Time-sensitive logic accepts `Instant` parameters
//!    so callers (and tests) own the clock

// =============================================================================
// Module Declarations
// =============================================================================

pub mod debounce;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use debounce::DebounceWindow;
pub use error::ValidationError;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Debounce window for repeat detections, in milliseconds.
///
/// ## Why 2000?
/// Consecutive video frames of one physical code arrive ~16-33ms apart.
/// Two seconds is long enough that a stationary code fires once, and short
/// enough that deliberately re-scanning the same code still feels instant.
pub const DEBOUNCE_WINDOW_MS: u64 = 2000;

/// Minimum contour area (px²) for a region to be considered a barcode
/// candidate. Empirical: smaller blobs are noise at typical hand-held
/// scanning distances.
pub const MIN_REGION_AREA_PX: f64 = 1000.0;

/// Lower bound of the long-to-short side ratio for a 1-D barcode silhouette.
pub const REGION_ASPECT_MIN: f64 = 2.5;

/// Upper bound of the long-to-short side ratio for a 1-D barcode silhouette.
pub const REGION_ASPECT_MAX: f64 = 8.0;

/// Maximum accepted barcode value length.
///
/// EAN-13/UPC-A are 8-13 digits; Code-128 payloads run longer. 64 keeps
/// room for every symbology the detection service emits.
pub const MAX_BARCODE_LEN: usize = 64;
