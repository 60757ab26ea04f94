//! End-to-end pipeline tests: session controller + stub camera + scripted
//! collaborators, covering the lifecycle, reconciliation, debounce, torch
//! probing, and stale-result scenarios.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use scanline_capture::backends::StubCameraBackend;
use scanline_capture::remote::{DetectRequest, DetectResponse, DetectedBarcode, DetectionService};
use scanline_capture::{
    CaptureConfig, CaptureError, CaptureMode, CaptureResult, CaptureSessionController,
    ScanEventEmitter, SessionState, StaticInventory,
};
use scanline_core::InventoryItem;

// =============================================================================
// Test Doubles
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Event {
    State(SessionState),
    Error { message: String, retryable: bool },
    Accepted(String),
    Matched(String),
    Torch { enabled: bool, supported: bool },
}

/// Emitter that records every event for later assertions.
#[derive(Default)]
struct RecordingEmitter {
    events: Mutex<Vec<Event>>,
}

impl RecordingEmitter {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn errors(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::Error { .. }))
            .collect()
    }
}

impl ScanEventEmitter for RecordingEmitter {
    fn emit_state(&self, state: SessionState) {
        self.events.lock().unwrap().push(Event::State(state));
    }
    fn emit_error(&self, message: &str, retryable: bool) {
        self.events.lock().unwrap().push(Event::Error {
            message: message.to_string(),
            retryable,
        });
    }
    fn emit_detection_accepted(&self, barcode: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Accepted(barcode.to_string()));
    }
    fn emit_product_matched(&self, item: &InventoryItem) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Matched(item.id.clone()));
    }
    fn emit_torch(&self, enabled: bool, supported: bool) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Torch { enabled, supported });
    }
}

/// Detection service replaying one scripted response per submission.
/// An exhausted script answers with zero candidates.
struct ScriptedDetection {
    responses: Mutex<VecDeque<CaptureResult<DetectResponse>>>,
}

impl ScriptedDetection {
    fn new(responses: Vec<CaptureResult<DetectResponse>>) -> Arc<Self> {
        Arc::new(ScriptedDetection {
            responses: Mutex::new(responses.into()),
        })
    }

    /// Every frame of the batch decodes `value` at the given confidence.
    fn constant(value: &str, confidence: f64, frames: usize) -> Arc<Self> {
        Self::new(
            (0..frames)
                .map(|_| Ok(reading(value, confidence)))
                .collect(),
        )
    }
}

#[async_trait]
impl DetectionService for ScriptedDetection {
    async fn submit(&self, request: DetectRequest) -> CaptureResult<DetectResponse> {
        assert!(request.image.starts_with("data:image/jpeg;base64,"));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DetectResponse::empty()))
    }
}

/// Detection service that blocks every submission on a semaphore so a test
/// can invalidate the session while the call is in flight.
struct GatedDetection {
    gate: Arc<Semaphore>,
    value: String,
}

#[async_trait]
impl DetectionService for GatedDetection {
    async fn submit(&self, _request: DetectRequest) -> CaptureResult<DetectResponse> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| CaptureError::TransportError(e.to_string()))?;
        permit.forget();
        Ok(reading(&self.value, 0.9))
    }
}

fn reading(value: &str, confidence: f64) -> DetectResponse {
    DetectResponse::with_barcodes(vec![DetectedBarcode {
        data: value.to_string(),
        confidence: Some(confidence),
    }])
}

fn item(id: &str, barcode: &str, quantity: i64) -> InventoryItem {
    InventoryItem {
        id: id.to_string(),
        category_id: "cat-1".to_string(),
        category_name: Some("Drinks".to_string()),
        name: format!("Item {}", id),
        description: None,
        price_cents: 199,
        quantity,
        sku: Some(format!("SKU-{}", id)),
        barcode: Some(barcode.to_string()),
    }
}

fn controller(
    backend: StubCameraBackend,
    detection: Arc<dyn DetectionService>,
    inventory: Vec<InventoryItem>,
    emitter: Arc<RecordingEmitter>,
) -> CaptureSessionController {
    CaptureSessionController::with_emitter(
        Arc::new(backend),
        detection,
        Arc::new(StaticInventory::new(inventory)),
        CaptureConfig::default(),
        emitter,
    )
}

// =============================================================================
// Explicit Capture Scenarios
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_edit_flow_self_match_enables_submit() {
    // Edit flow for item X (barcode "123"): scanning its own code must not
    // raise a conflict.
    let emitter = Arc::new(RecordingEmitter::default());
    let mut session = controller(
        StubCameraBackend::new(320, 240),
        ScriptedDetection::constant("123", 0.9, 3),
        vec![item("x", "123", 5)],
        emitter.clone(),
    );
    session.editing_item(Some("x".to_string()));

    session.open(CaptureMode::Explicit).await;
    let result = session.scan().await.expect("scan should resolve");

    assert_eq!(result.barcode, "123");
    assert!(!result.has_conflict());
    assert_eq!(session.state(), SessionState::Ready);
    assert!(emitter.errors().is_empty());

    session.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_add_flow_conflict_blocks_until_value_changes() {
    // Add flow: "999" already belongs to record Y, so the first scan
    // carries a conflict; a later scan reading a free value does not.
    let emitter = Arc::new(RecordingEmitter::default());
    let detection = ScriptedDetection::new(
        std::iter::repeat_with(|| Ok(reading("999", 0.8)))
            .take(3)
            .chain(std::iter::repeat_with(|| Ok(reading("777", 0.8))).take(3))
            .collect(),
    );
    let mut session = controller(
        StubCameraBackend::new(320, 240),
        detection,
        vec![item("y", "999", 2)],
        emitter.clone(),
    );

    session.open(CaptureMode::Explicit).await;

    let conflicted = session.scan().await.expect("first scan should resolve");
    assert!(conflicted.has_conflict());
    let record = conflicted.matched_item.unwrap();
    assert_eq!(record.id, "y");
    assert_eq!(record.sku.as_deref(), Some("SKU-y"));

    let free = session.scan().await.expect("second scan should resolve");
    assert_eq!(free.barcode, "777");
    assert!(!free.has_conflict());

    session.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_batch_winner_is_highest_confidence_frame() {
    // Confidences 0.4 / 0.9 / 0.6 across the burst: the middle frame wins.
    let emitter = Arc::new(RecordingEmitter::default());
    let detection = ScriptedDetection::new(vec![
        Ok(reading("555", 0.4)),
        Ok(reading("555", 0.9)),
        Ok(reading("555", 0.6)),
    ]);
    let mut session = controller(
        StubCameraBackend::new(320, 240),
        detection,
        Vec::new(),
        emitter.clone(),
    );

    session.open(CaptureMode::Explicit).await;
    let result = session.scan().await.expect("scan should resolve");
    assert_eq!(result.barcode, "555");
    assert!(!result.has_conflict());

    session.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_surfaces_retryable_and_recovers() {
    let emitter = Arc::new(RecordingEmitter::default());
    let detection = ScriptedDetection::new(vec![Err(CaptureError::TransportError(
        "connection refused".into(),
    ))]);
    let mut session = controller(
        StubCameraBackend::new(320, 240),
        detection,
        Vec::new(),
        emitter.clone(),
    );

    session.open(CaptureMode::Explicit).await;
    assert!(session.scan().await.is_none());

    // The session recovers to Ready and the message is marked retryable.
    assert_eq!(session.state(), SessionState::Ready);
    assert!(matches!(
        emitter.errors().first(),
        Some(Event::Error { retryable: true, .. })
    ));

    session.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_stale_detection_result_is_dropped() {
    // The remote call is gated; the session is invalidated while it is in
    // flight, so the late-arriving result produces no observable change.
    let gate = Arc::new(Semaphore::new(0));
    let emitter = Arc::new(RecordingEmitter::default());
    let mut session = controller(
        StubCameraBackend::new(320, 240),
        Arc::new(GatedDetection {
            gate: gate.clone(),
            value: "123".to_string(),
        }),
        vec![item("x", "123", 5)],
        emitter.clone(),
    );

    session.open(CaptureMode::Explicit).await;
    let handle = session.invalidate_handle();

    let task = tokio::spawn(async move { session.scan().await });

    // Let the burst finish sampling and the remote call park on the gate.
    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.invalidate();
    gate.add_permits(3);

    let result = task.await.unwrap();
    assert!(result.is_none());

    // No error surfaced and no Ready transition fired after invalidation:
    // the last recorded state change is the one into Resolving.
    assert!(emitter.errors().is_empty());
    assert_eq!(
        emitter
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::State(_)))
            .last(),
        Some(Event::State(SessionState::Resolving))
    );
}

// =============================================================================
// Device Scenarios
// =============================================================================

#[tokio::test]
async fn test_torch_probe_unsupported_stays_off() {
    let emitter = Arc::new(RecordingEmitter::default());
    let mut session = controller(
        StubCameraBackend::new(320, 240),
        ScriptedDetection::new(Vec::new()),
        Vec::new(),
        emitter.clone(),
    );

    session.open(CaptureMode::Explicit).await;
    assert!(session.torch_available());

    let on = session.set_torch(true).await;
    assert!(!on);
    assert!(!session.torch_on());
    assert!(!session.torch_available());
    assert_eq!(session.state(), SessionState::Ready);

    // The probe outcome reaches the UI as an event, never as an error.
    assert!(emitter.errors().is_empty());
    assert!(emitter.events().contains(&Event::Torch {
        enabled: false,
        supported: false
    }));

    session.close().await;
}

#[tokio::test]
async fn test_torch_applies_on_capable_device() {
    let emitter = Arc::new(RecordingEmitter::default());
    let mut session = controller(
        StubCameraBackend::new(320, 240).with_torch(),
        ScriptedDetection::new(Vec::new()),
        Vec::new(),
        emitter.clone(),
    );

    session.open(CaptureMode::Explicit).await;
    assert!(session.set_torch(true).await);
    assert!(session.torch_on());

    // Close always leaves the torch off with the stream.
    session.close().await;
    assert!(!session.torch_on());
}

#[tokio::test]
async fn test_session_close_is_idempotent() {
    let emitter = Arc::new(RecordingEmitter::default());
    let mut session = controller(
        StubCameraBackend::new(320, 240),
        ScriptedDetection::new(Vec::new()),
        Vec::new(),
        emitter.clone(),
    );

    session.open(CaptureMode::Explicit).await;
    session.close().await;
    session.close().await;
    session.close().await;
    assert_eq!(session.state(), SessionState::Closed);

    // Only one Closed transition was emitted.
    let closed_events = emitter
        .events()
        .into_iter()
        .filter(|e| *e == Event::State(SessionState::Closed))
        .count();
    assert_eq!(closed_events, 1);
}

#[tokio::test]
async fn test_permission_denied_surfaces_as_retryable() {
    let emitter = Arc::new(RecordingEmitter::default());
    let mut session = controller(
        StubCameraBackend::new(320, 240).deny_permission(),
        ScriptedDetection::new(Vec::new()),
        Vec::new(),
        emitter.clone(),
    );

    assert_eq!(session.open(CaptureMode::Explicit).await, SessionState::Error);
    assert!(matches!(
        emitter.errors().first(),
        Some(Event::Error { retryable: true, .. })
    ));
}

// =============================================================================
// Continuous Scan Scenarios
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_continuous_scan_matches_and_debounces() {
    let emitter = Arc::new(RecordingEmitter::default());
    let mut session = controller(
        StubCameraBackend::new(320, 240).with_bar_pattern(),
        ScriptedDetection::new(Vec::new()),
        vec![item("a", "111", 5)],
        emitter.clone(),
    );

    session.open(CaptureMode::Continuous).await;
    let mut matches = session.start_scan_loop().await.expect("loop should start");

    let first = matches.recv().await.unwrap();
    let t1 = tokio::time::Instant::now();
    assert_eq!(first.barcode, "111");
    assert_eq!(first.item.id, "a");

    // The bar sits in every frame; the next delivery waits out the window.
    let second = matches.recv().await.unwrap();
    let t2 = tokio::time::Instant::now();
    assert!(t2.duration_since(t1) >= Duration::from_millis(2000));
    assert_eq!(second.barcode, "111");

    // Acceptance feedback fired for each delivered match.
    let accepted = emitter
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::Accepted(_)))
        .count();
    assert_eq!(accepted, 2);

    session.close().await;

    // Teardown closes the match channel.
    assert!(matches.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_close_stops_scan_loop_before_release() {
    let emitter = Arc::new(RecordingEmitter::default());
    let mut session = controller(
        StubCameraBackend::new(320, 240).with_bar_pattern(),
        ScriptedDetection::new(Vec::new()),
        vec![item("a", "111", 5)],
        emitter.clone(),
    );

    session.open(CaptureMode::Continuous).await;
    let mut matches = session.start_scan_loop().await.expect("loop should start");
    matches.recv().await.unwrap();

    session.close().await;
    assert_eq!(session.state(), SessionState::Closed);

    // No frame from the released stream produces a match afterwards.
    assert!(matches.recv().await.is_none());
}

#[tokio::test]
async fn test_scan_loop_requires_ready() {
    let emitter = Arc::new(RecordingEmitter::default());
    let mut session = controller(
        StubCameraBackend::new(320, 240),
        ScriptedDetection::new(Vec::new()),
        Vec::new(),
        emitter,
    );

    assert!(session.start_scan_loop().await.is_none());
}
