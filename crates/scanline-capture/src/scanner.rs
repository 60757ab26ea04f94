//! # Local Heuristic Scanner
//!
//! The continuous scan loop: a cancellable, self-rescheduling cycle that
//! segments candidate barcode regions from sampled frames and matches them
//! against the in-memory product index without a network round trip.
//!
//! ## Cycle Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         One Scan Cycle                                  │
//! │                                                                         │
//! │  top of cycle: cancellation token checked ── set? ──► loop exits        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sample frame ── NotReady? ──► idle cycle, reschedule                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  region heuristic ── capability absent? ──► graceful no-op,             │
//! │       │                                      reschedule anyway          │
//! │       ▼                                                                 │
//! │  candidate region present ──► index match ──► debounce window           │
//! │       │                                            │                    │
//! │       ▼                                            ▼                    │
//! │  no candidates: reschedule          suppressed: reschedule              │
//! │                                     accepted: emit + deliver match      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This mode performs NO symbol decoding: it detects "barcode-shaped region
//! present" and opportunistically matches any indexed product carrying a
//! nonzero-quantity barcode. Every acceptance passes the debounce window,
//! which suppresses ANY value inside the interval.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, trace};

use scanline_core::{DebounceWindow, InventoryItem, ProductIndex};
use scanline_vision::RegionAnalyzer;

use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::sampler::CameraPipeline;
use crate::session::ScanEventEmitter;

/// Capacity of the match delivery channel.
const MATCH_CHANNEL_CAPACITY: usize = 16;

// =============================================================================
// Scan Match
// =============================================================================

/// One accepted local-scan detection, delivered to the owning form.
#[derive(Debug, Clone)]
pub struct ScanMatch {
    /// Barcode value of the matched product.
    pub barcode: String,

    /// The matched product, ready to add.
    pub item: InventoryItem,

    /// Index of the frame the candidate region came from.
    pub frame_index: u64,
}

// =============================================================================
// Scanner Handle
// =============================================================================

/// Controls a running scan loop from outside.
pub struct ScannerHandle {
    cancel_tx: watch::Sender<bool>,
    debounce: Arc<Mutex<DebounceWindow>>,
}

impl ScannerHandle {
    /// Sets the cancellation token. The loop observes it at the top of its
    /// next cycle. Idempotent.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Whether the token has been set.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Value of the last accepted detection, if any.
    pub async fn last_accepted_value(&self) -> Option<String> {
        self.debounce.lock().await.last_value().map(str::to_string)
    }
}

// =============================================================================
// Local Heuristic Scanner
// =============================================================================

/// The continuous scan loop.
pub struct LocalHeuristicScanner {
    pipeline: Arc<Mutex<CameraPipeline>>,
    analyzer: Option<RegionAnalyzer>,
    index: ProductIndex,
    debounce: Arc<Mutex<DebounceWindow>>,
    interval: Duration,
    cancel_rx: watch::Receiver<bool>,
    emitter: Arc<dyn ScanEventEmitter>,
    match_tx: mpsc::Sender<ScanMatch>,
}

impl LocalHeuristicScanner {
    /// Creates a scanner over a shared camera pipeline.
    ///
    /// `analyzer` is `None` when the vision capability is unavailable; the
    /// loop still schedules every cycle so readiness can be re-checked
    /// without restarting the session.
    pub fn new(
        pipeline: Arc<Mutex<CameraPipeline>>,
        index: ProductIndex,
        analyzer: Option<RegionAnalyzer>,
        config: &CaptureConfig,
        emitter: Arc<dyn ScanEventEmitter>,
    ) -> (Self, ScannerHandle, mpsc::Receiver<ScanMatch>) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (match_tx, match_rx) = mpsc::channel(MATCH_CHANNEL_CAPACITY);
        let debounce = Arc::new(Mutex::new(DebounceWindow::new(config.debounce_window())));

        let scanner = LocalHeuristicScanner {
            pipeline,
            analyzer,
            index,
            debounce: debounce.clone(),
            interval: config.cycle_interval(),
            cancel_rx,
            emitter,
            match_tx,
        };
        let handle = ScannerHandle {
            cancel_tx,
            debounce,
        };
        (scanner, handle, match_rx)
    }

    /// Runs the loop until cancellation or receiver drop.
    pub async fn run(mut self) {
        info!(
            indexed_products = self.index.len(),
            vision_available = self.analyzer.is_some(),
            "Scan loop started"
        );

        loop {
            // Token checked at the top of every cycle.
            if *self.cancel_rx.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    if let Some(accepted) = self.cycle().await {
                        self.emitter.emit_detection_accepted(&accepted.barcode);
                        self.emitter.emit_product_matched(&accepted.item);
                        if self.match_tx.send(accepted).await.is_err() {
                            debug!("Match receiver dropped, stopping scan loop");
                            break;
                        }
                    }
                }
                changed = self.cancel_rx.changed() => {
                    if changed.is_err() || *self.cancel_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Scan loop stopped");
    }

    /// One scan cycle. Returns an accepted match, or `None` for an idle,
    /// no-op, candidate-free, or suppressed cycle.
    async fn cycle(&mut self) -> Option<ScanMatch> {
        let sampled = self.pipeline.lock().await.sample();
        let frame = match sampled {
            Ok(frame) => frame,
            // Stream dimensions not known yet: idle cycle.
            Err(CaptureError::NotReady) => return None,
            Err(e) => {
                debug!(error = %e, "Scan cycle skipped");
                return None;
            }
        };

        // Vision capability absent: graceful no-op, the loop reschedules.
        let analyzer = self.analyzer.as_ref()?;

        let regions = analyzer.analyze(&frame);
        if regions.is_empty() {
            return None;
        }

        let item = self.index.first_scannable()?.clone();
        let barcode = item.barcode.clone()?;

        let now = tokio::time::Instant::now().into_std();
        {
            let mut window = self.debounce.lock().await;
            if !window.try_accept_at(&barcode, now) {
                trace!("Detection suppressed inside debounce window");
                return None;
            }
        }

        debug!(
            barcode = %barcode,
            frame_index = frame.index(),
            regions = regions.len(),
            "Local heuristic accepted detection"
        );
        Some(ScanMatch {
            barcode,
            item,
            frame_index: frame.index(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
