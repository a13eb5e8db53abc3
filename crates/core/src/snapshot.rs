//! Point-in-time stock state of a product.

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};
use crate::id::ProductId;

/// Stock-tracking state of one product at one moment.
///
/// `quantity` is only meaningful while `tracking_enabled` is set. Snapshots are
/// derived from host state and never persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub tracking_enabled: bool,
    pub quantity: Option<i64>,
}

impl StockSnapshot {
    /// Snapshot of a product whose stock is managed.
    pub const fn tracked(quantity: i64) -> Self {
        Self {
            tracking_enabled: true,
            quantity: Some(quantity),
        }
    }

    /// Snapshot of a product with unlimited (unmanaged) stock.
    pub const fn untracked() -> Self {
        Self {
            tracking_enabled: false,
            quantity: None,
        }
    }

    /// Build a snapshot from a textual stock value as hosts store it in product meta.
    ///
    /// The text is ignored when tracking is off. When tracking is on it must be
    /// an integer; `"3.5"`, `""` and a missing value are all `InvalidSnapshot`.
    pub fn parse(tracking_enabled: bool, raw_quantity: Option<&str>) -> AuditResult<Self> {
        if !tracking_enabled {
            return Ok(Self::untracked());
        }
        let raw = raw_quantity
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuditError::invalid_snapshot("tracking enabled but quantity is missing"))?;
        let quantity = raw
            .parse::<i64>()
            .map_err(|_| AuditError::invalid_snapshot(format!("quantity '{raw}' is not an integer")))?;
        Ok(Self::tracked(quantity))
    }

    /// Quantity of a tracked snapshot.
    ///
    /// Fails when tracking is on but no quantity was captured.
    pub fn tracked_quantity(&self) -> AuditResult<i64> {
        self.quantity.ok_or_else(|| {
            AuditError::invalid_snapshot("tracking enabled but quantity is missing")
        })
    }
}

/// Identity of a product as it appears on an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub sku: Option<String>,
}

impl ProductRef {
    pub fn new(id: ProductId, sku: Option<String>) -> Self {
        Self { id, sku }
    }

    /// SKU for human-readable notes; empty when the product has none.
    pub fn sku_label(&self) -> &str {
        self.sku.as_deref().unwrap_or("")
    }
}
