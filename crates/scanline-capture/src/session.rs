//! # Capture Session Controller
//!
//! The state machine tying the pipeline together for one dialog/session.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Lifecycle                                  │
//! │                                                                         │
//! │            open()                acquire ok                             │
//! │  Closed ─────────► Opening ──────────────────► Ready                    │
//! │    ▲                  │                          │  ▲                   │
//! │    │                  │ acquire failed    scan() │  │ resolved /        │
//! │    │                  ▼                          ▼  │ errored           │
//! │    │                Error ◄──────────────── Resolving                   │
//! │    │                  │                          │                      │
//! │    └──────────────────┴─────────── close() ──────┘                      │
//! │                  (any state may close)                                  │
//! │                                                                         │
//! │  close() SYNCHRONOUSLY invalidates the session before anything else:    │
//! │  • the invalidation flag is stored first                                │
//! │  • the scan-loop cancellation token is set (exactly once)               │
//! │  • in-flight detection/reconciliation results are dropped on arrival    │
//! │                                                                         │
//! │  Re-opening after close creates a FRESH session, never reuses this one. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No error from the pipeline crosses this boundary into the owning form:
//! the form receives a successful [`ScanResult`] or no result at all, and
//! everything else arrives as emitter events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use scanline_core::{InventoryItem, ProductIndex, ScanResult};
use scanline_vision::{Frame, RegionAnalyzer};

use crate::config::CaptureConfig;
use crate::device::{CameraBackend, DeviceStreamManager, StreamConstraints, TorchSupport};
use crate::error::CaptureError;
use crate::inventory::InventoryGateway;
use crate::reconcile::ReconciliationEngine;
use crate::remote::{DetectionService, RemoteDetectionClient};
use crate::sampler::CameraPipeline;
use crate::scanner::{LocalHeuristicScanner, ScanMatch, ScannerHandle};

// =============================================================================
// Session State
// =============================================================================

/// Lifecycle state of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No stream held. Initial and terminal state.
    Closed,

    /// Stream acquisition in flight.
    Opening,

    /// Stream held, awaiting a capture or running the scan loop.
    Ready,

    /// Detection/reconciliation in flight. Manual scan is disabled until
    /// the session resolves or errors back to Ready.
    Resolving,

    /// Acquisition failed. Surfaced as a retryable message; the session
    /// may be re-opened.
    Error,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Closed => write!(f, "closed"),
            SessionState::Opening => write!(f, "opening"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Resolving => write!(f, "resolving"),
            SessionState::Error => write!(f, "error"),
        }
    }
}

/// Which capture strategy the session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Explicit single/multi-frame capture via the remote detector.
    /// Acquires the high-detail stream profile.
    Explicit,

    /// Continuous local heuristic scanning. Acquires the lighter profile.
    Continuous,
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Trait for emitting pipeline events to the owning UI.
///
/// The form binds events rather than polling: state transitions, retryable
/// error messages, acceptance feedback (mapped to a beep by the UI), and
/// torch availability all arrive here.
pub trait ScanEventEmitter: Send + Sync {
    /// Emits a session state transition.
    fn emit_state(&self, state: SessionState);

    /// Emits an inline error message for the capture UI.
    fn emit_error(&self, message: &str, retryable: bool);

    /// Emits acceptance feedback for a detection the local scanner kept.
    fn emit_detection_accepted(&self, barcode: &str);

    /// Emits the product the local scanner matched.
    fn emit_product_matched(&self, item: &InventoryItem);

    /// Emits torch state after a toggle attempt.
    fn emit_torch(&self, enabled: bool, supported: bool);
}

/// No-op event emitter for testing.
pub struct NoOpEmitter;

impl ScanEventEmitter for NoOpEmitter {
    fn emit_state(&self, _state: SessionState) {}
    fn emit_error(&self, _message: &str, _retryable: bool) {}
    fn emit_detection_accepted(&self, _barcode: &str) {}
    fn emit_product_matched(&self, _item: &InventoryItem) {}
    fn emit_torch(&self, _enabled: bool, _supported: bool) {}
}

// =============================================================================
// Invalidation Handle
// =============================================================================

/// Invalidates a session from outside the controller, standing in for the
/// unmount path of the owning dialog.
#[derive(Clone)]
pub struct SessionInvalidateHandle {
    invalidated: Arc<AtomicBool>,
}

impl SessionInvalidateHandle {
    /// Marks the session invalidated. In-flight results are dropped on
    /// arrival; a full close still releases the stream afterwards.
    pub fn invalidate(&self) {
        self.invalidated.store(true, Ordering::SeqCst);
    }

    /// Whether the session has been invalidated.
    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Capture Session Controller
// =============================================================================

/// Owns the camera pipeline, the detection client, the reconciliation
/// engine, and the scan loop for one session.
pub struct CaptureSessionController {
    id: Uuid,
    opened_at: Option<DateTime<Utc>>,
    config: CaptureConfig,
    state: SessionState,
    pipeline: Arc<Mutex<CameraPipeline>>,
    detector: RemoteDetectionClient,
    reconciler: ReconciliationEngine,
    gateway: Arc<dyn InventoryGateway>,
    emitter: Arc<dyn ScanEventEmitter>,
    invalidated: Arc<AtomicBool>,
    scanner_handle: Option<ScannerHandle>,
    scanner_task: Option<JoinHandle<()>>,
    current_item_id: Option<String>,
    last_error: Option<String>,
    torch_on: bool,
    torch_available: bool,
}

impl CaptureSessionController {
    /// Creates a session with the no-op emitter.
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        detection: Arc<dyn DetectionService>,
        gateway: Arc<dyn InventoryGateway>,
        config: CaptureConfig,
    ) -> Self {
        Self::with_emitter(backend, detection, gateway, config, Arc::new(NoOpEmitter))
    }

    /// Creates a session with a custom event emitter.
    pub fn with_emitter(
        backend: Arc<dyn CameraBackend>,
        detection: Arc<dyn DetectionService>,
        gateway: Arc<dyn InventoryGateway>,
        config: CaptureConfig,
        emitter: Arc<dyn ScanEventEmitter>,
    ) -> Self {
        let pipeline = CameraPipeline::new(DeviceStreamManager::new(backend));
        let detector = RemoteDetectionClient::new(detection, config.scan.jpeg_quality);
        let reconciler = ReconciliationEngine::new(gateway.clone());

        CaptureSessionController {
            id: Uuid::new_v4(),
            opened_at: None,
            config,
            state: SessionState::Closed,
            pipeline: Arc::new(Mutex::new(pipeline)),
            detector,
            reconciler,
            gateway,
            emitter,
            invalidated: Arc::new(AtomicBool::new(false)),
            scanner_handle: None,
            scanner_task: None,
            current_item_id: None,
            last_error: None,
            torch_on: false,
            torch_available: true,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Unique session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// When the session reached `Ready`, if it ever did.
    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }

    /// Last surfaced error message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the torch is currently on.
    pub fn torch_on(&self) -> bool {
        self.torch_on
    }

    /// Whether the active device exposed the torch capability. True until
    /// a probe reports otherwise.
    pub fn torch_available(&self) -> bool {
        self.torch_available
    }

    /// Marks this session as belonging to an edit flow for the given
    /// record, so a scan of its own barcode reconciles as a self-match.
    pub fn editing_item(&mut self, item_id: Option<String>) {
        self.current_item_id = item_id;
    }

    /// A handle that can invalidate this session from outside, covering
    /// the owning dialog's unmount path.
    pub fn invalidate_handle(&self) -> SessionInvalidateHandle {
        SessionInvalidateHandle {
            invalidated: self.invalidated.clone(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Opens the session: acquires a stream for the given capture mode.
    ///
    /// Only allowed from `Closed` or `Error` (retry). Acquisition failures
    /// move the session to `Error` and surface a retryable message through
    /// the emitter; nothing is thrown at the caller.
    pub async fn open(&mut self, mode: CaptureMode) -> SessionState {
        if !matches!(self.state, SessionState::Closed | SessionState::Error) {
            warn!(state = %self.state, "open() ignored");
            return self.state;
        }
        if self.invalidated.load(Ordering::SeqCst) {
            return self.state;
        }

        self.set_state(SessionState::Opening);
        let constraints = match mode {
            CaptureMode::Explicit => StreamConstraints::capture_profile(&self.config),
            CaptureMode::Continuous => StreamConstraints::scan_profile(&self.config),
        };

        let acquired = self.pipeline.lock().await.acquire(&constraints).await;
        if self.invalidated.load(Ordering::SeqCst) {
            return self.state;
        }

        match acquired {
            Ok(()) => {
                self.opened_at = Some(Utc::now());
                self.last_error = None;
                self.set_state(SessionState::Ready);
                info!(session_id = %self.id, ?mode, "Capture session ready");
            }
            Err(e) => {
                self.surface_error(&e);
                self.set_state(SessionState::Error);
            }
        }
        self.state
    }

    /// Runs one explicit capture: samples a burst of frames, submits it to
    /// the remote detector, and reconciles the winning symbol.
    ///
    /// Only enabled in `Ready`; the session sits in `Resolving` until the
    /// attempt resolves or errors back to `Ready`. Returns `None` on any
    /// failure (surfaced through the emitter) and after invalidation.
    pub async fn scan(&mut self) -> Option<ScanResult> {
        if self.state != SessionState::Ready {
            debug!(state = %self.state, "scan() ignored");
            return None;
        }
        self.set_state(SessionState::Resolving);

        let frames = match self.sample_burst().await {
            Ok(frames) => frames,
            Err(e) => {
                if self.invalidated.load(Ordering::SeqCst) {
                    return None;
                }
                self.surface_error(&e);
                self.set_state(SessionState::Ready);
                return None;
            }
        };
        if self.invalidated.load(Ordering::SeqCst) {
            return None;
        }

        let detection = self.detector.detect_batch(&frames).await;
        if self.invalidated.load(Ordering::SeqCst) {
            // Stale result: dropped, never applied.
            debug!(session_id = %self.id, "Detection result dropped after invalidation");
            return None;
        }

        let symbol = match detection {
            Ok(Some(symbol)) => symbol,
            Ok(None) => {
                self.surface_error(&CaptureError::NoSymbolDetected);
                self.set_state(SessionState::Ready);
                return None;
            }
            Err(e) => {
                self.surface_error(&e);
                self.set_state(SessionState::Ready);
                return None;
            }
        };

        let reconciled = self
            .reconciler
            .reconcile(&symbol.value, self.current_item_id.as_deref())
            .await;
        if self.invalidated.load(Ordering::SeqCst) {
            debug!(session_id = %self.id, "Reconciliation result dropped after invalidation");
            return None;
        }

        self.set_state(SessionState::Ready);
        match reconciled {
            Ok(matched) => {
                info!(
                    session_id = %self.id,
                    barcode = %symbol.value,
                    blocking = matched.is_blocking(),
                    "Scan resolved"
                );
                Some(matched.into_scan_result(symbol.value))
            }
            Err(e) => {
                self.surface_error(&e);
                None
            }
        }
    }

    /// Starts the continuous scan loop against a snapshot of the inventory.
    ///
    /// Only enabled in `Ready`. Returns the channel accepted matches are
    /// delivered on, or `None` when the loop could not start.
    pub async fn start_scan_loop(&mut self) -> Option<mpsc::Receiver<ScanMatch>> {
        if self.state != SessionState::Ready || self.scanner_task.is_some() {
            debug!(state = %self.state, "start_scan_loop() ignored");
            return None;
        }

        let snapshot = match self.gateway.snapshot().await {
            Ok(items) => items,
            Err(e) => {
                self.surface_error(&e);
                return None;
            }
        };
        if self.invalidated.load(Ordering::SeqCst) {
            return None;
        }

        let index = ProductIndex::from_snapshot(snapshot);
        let (scanner, handle, match_rx) = LocalHeuristicScanner::new(
            self.pipeline.clone(),
            index,
            Some(RegionAnalyzer::default()),
            &self.config,
            self.emitter.clone(),
        );
        self.scanner_handle = Some(handle);
        self.scanner_task = Some(tokio::spawn(scanner.run()));
        Some(match_rx)
    }

    /// Closes the session: invalidates it, cancels the scan loop, and
    /// releases the stream. Idempotent; callable from any state.
    pub async fn close(&mut self) {
        // Invalidation happens synchronously, before any await, so a result
        // arriving mid-close is already stale.
        let already = self.invalidated.swap(true, Ordering::SeqCst);

        if let Some(handle) = self.scanner_handle.take() {
            // The cancellation token is set exactly once, here.
            handle.cancel();
        }
        self.state = SessionState::Closed;
        if !already {
            self.emitter.emit_state(SessionState::Closed);
        }

        if let Some(task) = self.scanner_task.take() {
            let _ = task.await;
        }
        self.pipeline.lock().await.release();
        self.torch_on = false;

        if !already {
            info!(session_id = %self.id, "Capture session closed");
        }
    }

    /// Toggles the torch via a capability probe.
    ///
    /// Returns whether the torch is on afterwards. An unsupported device
    /// is not an error: the availability flag flips and the torch state
    /// stays off.
    pub async fn set_torch(&mut self, enabled: bool) -> bool {
        if !matches!(self.state, SessionState::Ready | SessionState::Resolving) {
            return false;
        }

        let probed = self.pipeline.lock().await.set_torch(enabled);
        match probed {
            Ok(TorchSupport::Applied) => {
                self.torch_on = enabled;
                self.torch_available = true;
                self.emitter.emit_torch(self.torch_on, true);
            }
            Ok(TorchSupport::Unsupported) => {
                self.torch_on = false;
                self.torch_available = false;
                self.emitter.emit_torch(false, false);
            }
            Err(e) => {
                debug!(error = %e, "Torch toggle failed");
            }
        }
        self.torch_on
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Samples an ordered burst of frames for batch detection.
    async fn sample_burst(&mut self) -> Result<Vec<Frame>, CaptureError> {
        let mut frames = Vec::with_capacity(self.config.scan.batch_size);
        for i in 0..self.config.scan.batch_size {
            if i > 0 {
                tokio::time::sleep(self.config.batch_spacing()).await;
            }
            if self.invalidated.load(Ordering::SeqCst) {
                return Err(CaptureError::StaleSession);
            }
            frames.push(self.pipeline.lock().await.sample()?);
        }
        Ok(frames)
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!(session_id = %self.id, from = %self.state, to = %state, "Session state change");
            self.state = state;
            self.emitter.emit_state(state);
        }
    }

    /// Surfaces an error per the propagation rules: silent variants are
    /// swallowed, everything else becomes an inline emitter message.
    fn surface_error(&mut self, error: &CaptureError) {
        if error.is_silent() {
            debug!(error = %error, "Swallowed silent error");
            return;
        }
        let message = error.to_string();
        warn!(session_id = %self.id, error = %message, "Capture error surfaced");
        self.last_error = Some(message.clone());
        self.emitter.emit_error(&message, error.is_retryable());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::StubCameraBackend;
    use crate::inventory::StaticInventory;
    use crate::remote::{DetectRequest, DetectResponse};
    use async_trait::async_trait;

    /// Detection service that always reports zero candidates.
    struct EmptyDetection;

    #[async_trait]
    impl DetectionService for EmptyDetection {
        async fn submit(&self, _request: DetectRequest) -> crate::CaptureResult<DetectResponse> {
            Ok(DetectResponse::empty())
        }
    }

    fn controller(backend: StubCameraBackend) -> CaptureSessionController {
        CaptureSessionController::new(
            Arc::new(backend),
            Arc::new(EmptyDetection),
            Arc::new(StaticInventory::default()),
            CaptureConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_initial_state_is_closed() {
        let session = controller(StubCameraBackend::new(320, 240));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.opened_at().is_none());
    }

    #[tokio::test]
    async fn test_open_reaches_ready() {
        let mut session = controller(StubCameraBackend::new(320, 240));
        assert_eq!(session.open(CaptureMode::Explicit).await, SessionState::Ready);
        assert!(session.opened_at().is_some());
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_open_failure_moves_to_error() {
        let mut session = controller(StubCameraBackend::new(320, 240).deny_permission());
        assert_eq!(session.open(CaptureMode::Explicit).await, SessionState::Error);
        assert!(session.last_error().unwrap().contains("permission"));
    }

    #[tokio::test]
    async fn test_open_from_error_retries() {
        let mut session = controller(StubCameraBackend::new(320, 240).deny_permission());
        session.open(CaptureMode::Explicit).await;
        assert_eq!(session.state(), SessionState::Error);
        // A retry runs the whole acquisition again.
        assert_eq!(session.open(CaptureMode::Explicit).await, SessionState::Error);
    }

    #[tokio::test]
    async fn test_open_ignored_while_ready() {
        let mut session = controller(StubCameraBackend::new(320, 240));
        session.open(CaptureMode::Explicit).await;
        assert_eq!(session.open(CaptureMode::Explicit).await, SessionState::Ready);
        session.close().await;
    }

    #[tokio::test]
    async fn test_scan_requires_ready() {
        let mut session = controller(StubCameraBackend::new(320, 240));
        assert!(session.scan().await.is_none());
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_candidates_returns_to_ready() {
        let mut session = controller(StubCameraBackend::new(320, 240));
        session.open(CaptureMode::Explicit).await;

        assert!(session.scan().await.is_none());
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.last_error().unwrap().contains("No barcode"));
        session.close().await;
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut session = controller(StubCameraBackend::new(320, 240));
        session.open(CaptureMode::Explicit).await;
        session.close().await;
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_open_after_invalidation_is_refused() {
        let mut session = controller(StubCameraBackend::new(320, 240));
        session.invalidate_handle().invalidate();
        assert_eq!(session.open(CaptureMode::Explicit).await, SessionState::Closed);
    }
}
