//! # scanline-capture: Barcode Capture & Reconciliation Pipeline
//!
//! The async layer that turns a live camera feed into a verified barcode
//! string reconciled against an inventory record.
//!
//! ## Pipeline Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Capture Data Flow                                 │
//! │                                                                         │
//! │   CaptureSessionController (session.rs)                                 │
//! │        │ owns                                                           │
//! │        ▼                                                                │
//! │   DeviceStreamManager (device.rs) ──► FrameSampler (sampler.rs)         │
//! │                                            │                            │
//! │             ┌──────────────────────────────┴─────────────┐              │
//! │             ▼ explicit capture                continuous ▼              │
//! │   RemoteDetectionClient (remote.rs)   LocalHeuristicScanner (scanner)   │
//! │             │ DecodedSymbol                   │ ScanMatch               │
//! │             ▼                                 │ (debounced)             │
//! │   ReconciliationEngine (reconcile.rs)         │                         │
//! │             │ NoMatch | MatchSelf | MatchOther│                         │
//! │             ▼                                 ▼                         │
//! │        owning form (ScanResult)          owning form                    │
//! │                                                                         │
//! │   Collaborator boundaries (traits):                                     │
//! │   • CameraBackend (device.rs, backends/)                                │
//! │   • DetectionService (remote.rs)                                        │
//! │   • InventoryGateway (inventory.rs)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`session`] - the per-dialog state machine and event emission
//! - [`device`] - exclusive stream ownership, torch capability probing
//! - [`sampler`] - native-resolution frame copies
//! - [`remote`] - encoded-frame submission, batch confidence aggregation
//! - [`scanner`] - the cancellable continuous scan loop
//! - [`reconcile`] - dual-path lookup normalized to one three-way result
//! - [`inventory`] - the read-only inventory collaborator boundary
//! - [`backends`] - camera implementations (stub; `camera-nokhwa` feature)
//! - [`config`] - TOML configuration with environment overrides
//! - [`error`] - the capture error taxonomy

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backends;
pub mod config;
pub mod device;
pub mod error;
pub mod inventory;
pub mod reconcile;
pub mod remote;
pub mod sampler;
pub mod scanner;
pub mod session;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{CaptureConfig, FacingMode};
pub use device::{CameraBackend, CameraStream, DeviceStreamManager, StreamConstraints, TorchSupport};
pub use error::{CaptureError, CaptureResult};
pub use inventory::{InventoryGateway, LookupFailure, StaticInventory, VerifyOutcome};
pub use reconcile::ReconciliationEngine;
pub use remote::{DetectionService, RemoteDetectionClient};
pub use sampler::{CameraPipeline, FrameSampler};
pub use scanner::{LocalHeuristicScanner, ScanMatch, ScannerHandle};
pub use session::{
    CaptureMode, CaptureSessionController, NoOpEmitter, ScanEventEmitter, SessionInvalidateHandle,
    SessionState,
};
