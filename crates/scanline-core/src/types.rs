//! # Domain Types
//!
//! Core domain types used throughout the scanline pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │  DecodedSymbol  │   │   ScanResult    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  value          │   │  barcode        │       │
//! │  │  name / sku     │   │  confidence     │   │  matched_item   │       │
//! │  │  barcode        │   │  frame index    │   │  (conflict?)    │       │
//! │  │  quantity       │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  BarcodeMatch: NoMatch | MatchSelf | MatchOther(InventoryItem)  │   │
//! │  │  The one branch set every reconciliation call site sees.        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `InventoryItem` is a read-only snapshot of a record owned by the
//! inventory collaborator; the pipeline never mutates it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Inventory Item (snapshot)
// =============================================================================

/// A read-only snapshot of an inventory record.
///
/// Owned by the inventory collaborator; the pipeline only reads it to
/// reconcile scanned values and to drive the local heuristic match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItem {
    /// Unique identifier assigned by the inventory collaborator.
    pub id: String,

    /// Category the item belongs to.
    pub category_id: String,

    /// Denormalized category name, shown in conflict warnings.
    pub category_name: Option<String>,

    /// Display name.
    pub name: String,

    /// Optional free-text description.
    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current stock level.
    pub quantity: i64,

    /// Stock Keeping Unit - business identifier.
    pub sku: Option<String>,

    /// Barcode value (EAN-13, UPC-A, etc.), if one is assigned.
    pub barcode: Option<String>,
}

impl InventoryItem {
    /// An item is scannable by the local heuristic when it carries a
    /// barcode and has stock to sell.
    #[inline]
    pub fn is_scannable(&self) -> bool {
        self.barcode.is_some() && self.quantity > 0
    }
}

// =============================================================================
// Decoded Symbol
// =============================================================================

/// A decoded barcode value produced by one detection attempt.
///
/// Ephemeral: produced per attempt, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DecodedSymbol {
    /// The decoded barcode string.
    pub value: String,

    /// Detection confidence in [0.0, 1.0]. Services that report none get 0.
    pub confidence: f32,

    /// Index of the sampled frame this symbol came from.
    pub source_frame_index: u64,
}

impl DecodedSymbol {
    /// Creates a symbol, clamping confidence into [0.0, 1.0].
    pub fn new(value: impl Into<String>, confidence: f32, source_frame_index: u64) -> Self {
        DecodedSymbol {
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source_frame_index,
        }
    }
}

// =============================================================================
// Barcode Match
// =============================================================================

/// The three-way reconciliation result.
///
/// Both lookup paths of the inventory collaborator normalize into this one
/// enum, so calling code has a single branch set regardless of which
/// backend path answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BarcodeMatch {
    /// Value is free to use.
    NoMatch,

    /// The match is the record currently being edited. Treated as NoMatch
    /// for submission purposes.
    MatchSelf,

    /// A different record already owns this value; submission must be
    /// blocked and the conflicting record shown to the user.
    MatchOther(InventoryItem),
}

impl BarcodeMatch {
    /// Returns true when this match should block form submission.
    #[inline]
    pub fn is_blocking(&self) -> bool {
        matches!(self, BarcodeMatch::MatchOther(_))
    }

    /// Returns the conflicting record, if any.
    pub fn conflict(&self) -> Option<&InventoryItem> {
        match self {
            BarcodeMatch::MatchOther(item) => Some(item),
            _ => None,
        }
    }

    /// Converts the match into the `ScanResult` handed to the owning form.
    pub fn into_scan_result(self, barcode: impl Into<String>) -> ScanResult {
        let matched_item = match self {
            BarcodeMatch::MatchOther(item) => Some(item),
            BarcodeMatch::NoMatch | BarcodeMatch::MatchSelf => None,
        };
        ScanResult {
            barcode: barcode.into(),
            matched_item,
        }
    }
}

// =============================================================================
// Scan Result
// =============================================================================

/// The pipeline's terminal output, consumed exactly once by the calling
/// form: a verified barcode value plus an optional conflicting record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScanResult {
    /// The verified barcode value.
    pub barcode: String,

    /// A different record that already owns this value, if one exists.
    /// `None` covers both no-match and self-match.
    pub matched_item: Option<InventoryItem>,
}

impl ScanResult {
    /// Returns true when the owning form must gate its submit action.
    #[inline]
    pub fn has_conflict(&self) -> bool {
        self.matched_item.is_some()
    }
}

// =============================================================================
// Product Index
// =============================================================================

/// An in-memory, read-only snapshot of inventory records consulted by the
/// local heuristic scanner.
///
/// The snapshot is owned by the inventory collaborator and refreshed
/// externally; the pipeline never writes through it.
#[derive(Debug, Clone, Default)]
pub struct ProductIndex {
    items: Vec<InventoryItem>,
}

impl ProductIndex {
    /// Builds an index from a snapshot of records.
    pub fn from_snapshot(items: Vec<InventoryItem>) -> Self {
        ProductIndex { items }
    }

    /// Exact barcode lookup.
    pub fn lookup_barcode(&self, barcode: &str) -> Option<&InventoryItem> {
        self.items
            .iter()
            .find(|item| item.barcode.as_deref() == Some(barcode))
    }

    /// First item the coarse heuristic can match: any product carrying a
    /// barcode with nonzero quantity. The local scan path detects
    /// "barcode-shaped region present" without decoding symbol content,
    /// so this is deliberately not a value lookup.
    pub fn first_scannable(&self) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.is_scannable())
    }

    /// Number of records in the snapshot.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the snapshot holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, barcode: Option<&str>, quantity: i64) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            category_id: "cat-1".to_string(),
            category_name: Some("Drinks".to_string()),
            name: format!("Item {}", id),
            description: None,
            price_cents: 150,
            quantity,
            sku: Some(format!("SKU-{}", id)),
            barcode: barcode.map(str::to_string),
        }
    }

    #[test]
    fn test_is_scannable() {
        assert!(item("a", Some("123"), 5).is_scannable());
        assert!(!item("b", Some("123"), 0).is_scannable());
        assert!(!item("c", None, 5).is_scannable());
    }

    #[test]
    fn test_symbol_confidence_clamped() {
        assert_eq!(DecodedSymbol::new("123", 1.7, 0).confidence, 1.0);
        assert_eq!(DecodedSymbol::new("123", -0.2, 0).confidence, 0.0);
    }

    #[test]
    fn test_match_other_blocks_submission() {
        let conflict = BarcodeMatch::MatchOther(item("x", Some("999"), 1));
        assert!(conflict.is_blocking());
        assert_eq!(conflict.conflict().unwrap().id, "x");

        assert!(!BarcodeMatch::NoMatch.is_blocking());
        assert!(!BarcodeMatch::MatchSelf.is_blocking());
    }

    #[test]
    fn test_self_match_produces_conflict_free_result() {
        let result = BarcodeMatch::MatchSelf.into_scan_result("123");
        assert_eq!(result.barcode, "123");
        assert!(!result.has_conflict());
    }

    #[test]
    fn test_match_other_carries_record_into_result() {
        let result = BarcodeMatch::MatchOther(item("y", Some("999"), 1)).into_scan_result("999");
        assert!(result.has_conflict());
        assert_eq!(result.matched_item.unwrap().id, "y");
    }

    #[test]
    fn test_index_lookup_and_first_scannable() {
        let index = ProductIndex::from_snapshot(vec![
            item("a", None, 5),
            item("b", Some("111"), 0),
            item("c", Some("222"), 3),
        ]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup_barcode("222").unwrap().id, "c");
        assert!(index.lookup_barcode("333").is_none());
        // "a" has no barcode, "b" is out of stock
        assert_eq!(index.first_scannable().unwrap().id, "c");
    }

    #[test]
    fn test_empty_index() {
        let index = ProductIndex::default();
        assert!(index.is_empty());
        assert!(index.first_scannable().is_none());
    }
}
