//! Snapshot cache for two-phase (capture, then compare) operations.
//!
//! A cache belongs to exactly one logical operation: one bulk-edit batch, one
//! purchase-order stock change, one stock-central save. Construct it at the
//! entry point of that operation and drop it when the operation ends.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use invtrack_core::{Catalog, ProductId, ProductRef, ProductSnapshotSource, StockSnapshot};

/// Identity of the operation a cache belongs to (for logs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationScope {
    pub id: Uuid,
    pub label: String,
}

impl OperationScope {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            label: label.into(),
        }
    }
}

/// "Before" state of one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedProduct {
    pub product: ProductRef,
    pub snapshot: StockSnapshot,
}

/// Per-operation map from product id to its captured "before" snapshot.
///
/// Entries are write-once (a second capture of the same product keeps the
/// first one) and read-once (`take` removes the entry).
#[derive(Debug)]
pub struct SnapshotCache {
    scope: OperationScope,
    entries: HashMap<ProductId, CapturedProduct>,
}

impl SnapshotCache {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            scope: OperationScope::new(label),
            entries: HashMap::new(),
        }
    }

    pub fn scope(&self) -> &OperationScope {
        &self.scope
    }

    /// Capture the current state of `product`. Returns false if it was already captured.
    pub fn capture<P>(&mut self, product: &P) -> bool
    where
        P: ProductSnapshotSource + ?Sized,
    {
        let id = product.product_id();
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(
            id,
            CapturedProduct {
                product: ProductRef::new(id, product.sku()),
                snapshot: product.stock_snapshot(),
            },
        );
        true
    }

    /// Fetch `id` from the catalog and capture it. Unknown products are skipped.
    pub fn capture_from<C>(&mut self, catalog: &C, id: ProductId) -> bool
    where
        C: Catalog + ?Sized,
    {
        match catalog.get_product(id) {
            Some(product) => self.capture(&product),
            None => false,
        }
    }

    /// Consume the captured snapshot for `id`.
    pub fn take(&mut self, id: ProductId) -> Option<CapturedProduct> {
        self.entries.remove(&id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End the operation, returning whatever was captured but never compared.
    pub fn into_unconsumed(self) -> Vec<CapturedProduct> {
        let mut left: Vec<_> = self.entries.into_values().collect();
        left.sort_by_key(|c| c.product.id);
        left
    }
}
