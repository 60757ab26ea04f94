//! # Inventory Collaborator Boundary
//!
//! The read-only contract the pipeline consumes from the inventory
//! collaborator. The pipeline never writes inventory state.
//!
//! Two lookup paths exist because the collaborator answers the same
//! question two ways: a direct by-barcode query that signals not-found as a
//! failure, and a verification call that returns an existence flag plus the
//! record. The reconciliation engine normalizes both into one result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use scanline_core::InventoryItem;

use crate::error::CaptureResult;

// =============================================================================
// Lookup Outcomes
// =============================================================================

/// Why a direct lookup did not return a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// No record carries the value. Not an availability problem.
    NotFound,

    /// The collaborator was unreachable or rejected the query.
    Backend(String),
}

impl std::fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupFailure::NotFound => write!(f, "no record found"),
            LookupFailure::Backend(msg) => write!(f, "{}", msg),
        }
    }
}

/// Result of the secondary verification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOutcome {
    /// Whether any record carries the value.
    pub exists: bool,

    /// The carrying record, when the collaborator includes it.
    #[serde(default)]
    pub product: Option<InventoryItem>,
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// Read-only access to the inventory collaborator.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// Direct by-barcode query. Not-found is signaled as a failure shape,
    /// matching the collaborator's contract.
    async fn get_by_barcode(&self, value: &str) -> Result<InventoryItem, LookupFailure>;

    /// Secondary verification: existence flag plus the record.
    async fn verify_barcode(&self, value: &str) -> Result<VerifyOutcome, LookupFailure>;

    /// A read-only snapshot of records for the local heuristic index.
    async fn snapshot(&self) -> CaptureResult<Vec<InventoryItem>>;
}

// =============================================================================
// Static Gateway
// =============================================================================

/// An in-memory gateway over a fixed snapshot. Backs the test suite and
/// any host that already holds the inventory list locally.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    items: Vec<InventoryItem>,
}

impl StaticInventory {
    /// Creates a gateway over the given records.
    pub fn new(items: Vec<InventoryItem>) -> Self {
        StaticInventory { items }
    }
}

#[async_trait]
impl InventoryGateway for StaticInventory {
    async fn get_by_barcode(&self, value: &str) -> Result<InventoryItem, LookupFailure> {
        self.items
            .iter()
            .find(|item| item.barcode.as_deref() == Some(value))
            .cloned()
            .ok_or(LookupFailure::NotFound)
    }

    async fn verify_barcode(&self, value: &str) -> Result<VerifyOutcome, LookupFailure> {
        let product = self
            .items
            .iter()
            .find(|item| item.barcode.as_deref() == Some(value))
            .cloned();
        Ok(VerifyOutcome {
            exists: product.is_some(),
            product,
        })
    }

    async fn snapshot(&self) -> CaptureResult<Vec<InventoryItem>> {
        Ok(self.items.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, barcode: &str) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            category_id: "cat-1".to_string(),
            category_name: None,
            name: format!("Item {}", id),
            description: None,
            price_cents: 100,
            quantity: 3,
            sku: None,
            barcode: Some(barcode.to_string()),
        }
    }

    #[tokio::test]
    async fn test_static_gateway_lookup() {
        let gateway = StaticInventory::new(vec![item("a", "111"), item("b", "222")]);

        assert_eq!(gateway.get_by_barcode("222").await.unwrap().id, "b");
        assert_eq!(
            gateway.get_by_barcode("333").await.unwrap_err(),
            LookupFailure::NotFound
        );
    }

    #[tokio::test]
    async fn test_static_gateway_verify() {
        let gateway = StaticInventory::new(vec![item("a", "111")]);

        let hit = gateway.verify_barcode("111").await.unwrap();
        assert!(hit.exists);
        assert_eq!(hit.product.unwrap().id, "a");

        let miss = gateway.verify_barcode("999").await.unwrap();
        assert!(!miss.exists);
        assert!(miss.product.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let gateway = StaticInventory::new(vec![item("a", "111")]);
        let snapshot = gateway.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }
}
