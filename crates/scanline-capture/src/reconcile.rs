//! # Reconciliation Engine
//!
//! Determines whether a decoded barcode value already belongs to an
//! inventory record, and whether that record is the one being edited.
//!
//! ## Dual-Path Normalization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  reconcile(barcode, current_item_id)                    │
//! │                                                                         │
//! │   get_by_barcode ──ok──────────────────────────┐                        │
//! │        │ failed (not-found OR backend)         │                        │
//! │        ▼                                       ▼                        │
//! │   verify_barcode ──ok──► exists? ──────► classify against               │
//! │        │ failed              │            current_item_id               │
//! │        ▼                     ▼                 │                        │
//! │   both backend-failed?   no ──► NoMatch        ▼                        │
//! │    yes: retryable error          NoMatch | MatchSelf | MatchOther       │
//! │    no:  NoMatch                                                         │
//! │                                                                         │
//! │  Call sites never learn which path answered: one tagged three-way       │
//! │  result is the whole contract.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A retryable error surfaces only when BOTH paths fail for non-not-found
//! reasons; not-found anywhere normalizes to `NoMatch`.

use std::sync::Arc;
use tracing::{debug, warn};

use scanline_core::validation::validate_barcode;
use scanline_core::{BarcodeMatch, InventoryItem};

use crate::error::{CaptureError, CaptureResult};
use crate::inventory::{InventoryGateway, LookupFailure, VerifyOutcome};

// =============================================================================
// Reconciliation Engine
// =============================================================================

/// Normalizes both inventory lookup paths into one three-way match.
pub struct ReconciliationEngine {
    gateway: Arc<dyn InventoryGateway>,
}

impl ReconciliationEngine {
    /// Creates an engine over the given inventory gateway.
    pub fn new(gateway: Arc<dyn InventoryGateway>) -> Self {
        ReconciliationEngine { gateway }
    }

    /// Looks up `barcode` and classifies the outcome against the record
    /// currently being edited, if any.
    pub async fn reconcile(
        &self,
        barcode: &str,
        current_item_id: Option<&str>,
    ) -> CaptureResult<BarcodeMatch> {
        validate_barcode(barcode)?;
        let barcode = barcode.trim();

        let direct_failure = match self.gateway.get_by_barcode(barcode).await {
            Ok(item) => {
                debug!(barcode, item_id = %item.id, "Direct lookup matched");
                return Ok(classify(item, current_item_id));
            }
            Err(failure) => failure,
        };

        debug!(barcode, failure = %direct_failure, "Direct lookup failed, trying verification");

        match self.gateway.verify_barcode(barcode).await {
            Ok(outcome) => Ok(classify_verify(outcome, current_item_id)),
            Err(LookupFailure::NotFound) => Ok(BarcodeMatch::NoMatch),
            Err(LookupFailure::Backend(fallback_msg)) => match direct_failure {
                // Only the fallback path had an availability problem; the
                // direct path authoritatively said not-found.
                LookupFailure::NotFound => {
                    warn!(barcode, error = %fallback_msg, "Verification path failed after not-found");
                    Ok(BarcodeMatch::NoMatch)
                }
                LookupFailure::Backend(direct_msg) => Err(CaptureError::InventoryUnavailable(
                    format!("{}; {}", direct_msg, fallback_msg),
                )),
            },
        }
    }
}

/// Classifies a matched record against the item being edited.
fn classify(item: InventoryItem, current_item_id: Option<&str>) -> BarcodeMatch {
    if current_item_id == Some(item.id.as_str()) {
        BarcodeMatch::MatchSelf
    } else {
        BarcodeMatch::MatchOther(item)
    }
}

/// Classifies a verification outcome. An existence flag without a record
/// cannot name a conflicting item, so it does not block.
fn classify_verify(outcome: VerifyOutcome, current_item_id: Option<&str>) -> BarcodeMatch {
    match (outcome.exists, outcome.product) {
        (true, Some(item)) => classify(item, current_item_id),
        _ => BarcodeMatch::NoMatch,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
