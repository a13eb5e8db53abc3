use chrono::{DateTime, Utc};
use serde::Serialize;

use invtrack_core::{AuditError, AuditResult, OrderId, ProductId, ProductRef, RecordId, UserId};

use crate::differ::StockDelta;

/// Coarse category of an audited change, one per event source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Reason {
    ProductEditor,
    QuickEdit,
    BulkEdit,
    OrderStockReduced,
    OrderStockRestored,
    LineItemDeleted,
    LineItemUpdated,
    OrderRefund,
    ExternalPurchaseOrder,
    ExternalStockCentral,
}

impl Reason {
    /// Stable label stored in the `reason` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::ProductEditor => "Admin Product Editor",
            Reason::QuickEdit => "Admin Quick Edit",
            Reason::BulkEdit => "Admin Bulk Edit",
            Reason::OrderStockReduced => "Order stock reduced",
            Reason::OrderStockRestored => "Order stock restored",
            Reason::LineItemDeleted => "Order Line Item Deleted",
            Reason::LineItemUpdated => "Order Line Item Updated",
            Reason::OrderRefund => "Order Refund",
            Reason::ExternalPurchaseOrder => "External PO Update",
            Reason::ExternalStockCentral => "External Stock Central Edit",
        }
    }
}

impl core::fmt::Display for Reason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected inventory change, ready to be appended to the audit log.
///
/// Immutable once built: fields are only readable, and `stock_change` is
/// always derived from the two levels. A record without any stock level
/// cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    timestamp: DateTime<Utc>,
    product_sku: Option<String>,
    product_id: ProductId,
    order_id: Option<OrderId>,
    user_id: UserId,
    stock_before: Option<i64>,
    stock_after: Option<i64>,
    stock_change: Option<i64>,
    reason: Option<String>,
    notes: Option<String>,
}

impl AuditRecord {
    pub fn builder(product: ProductRef) -> AuditRecordBuilder {
        AuditRecordBuilder::new(product)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn product_sku(&self) -> Option<&str> {
        self.product_sku.as_deref()
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn stock_before(&self) -> Option<i64> {
        self.stock_before
    }

    pub fn stock_after(&self) -> Option<i64> {
        self.stock_after
    }

    pub fn stock_change(&self) -> Option<i64> {
        self.stock_change
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Builder for [`AuditRecord`]; `build()` enforces the record invariants.
#[derive(Debug, Clone)]
pub struct AuditRecordBuilder {
    product: ProductRef,
    timestamp: Option<DateTime<Utc>>,
    order_id: Option<OrderId>,
    user_id: UserId,
    stock_before: Option<i64>,
    stock_after: Option<i64>,
    reason: Option<String>,
    notes: Option<String>,
}

impl AuditRecordBuilder {
    fn new(product: ProductRef) -> Self {
        Self {
            product,
            timestamp: None,
            order_id: None,
            user_id: UserId::GUEST,
            stock_before: None,
            stock_after: None,
            reason: None,
            notes: None,
        }
    }

    /// Start from a differ result: identity, levels and the differ's note.
    pub fn from_delta(delta: StockDelta) -> Self {
        Self::new(delta.product)
            .levels(delta.stock_before, delta.stock_after)
            .notes(delta.note)
    }

    pub fn levels(mut self, before: Option<i64>, after: Option<i64>) -> Self {
        self.stock_before = before;
        self.stock_after = after;
        self
    }

    pub fn order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn reason(self, reason: Reason) -> Self {
        self.reason_label(reason.as_str())
    }

    /// Free-form reason, used when restoring rows written by older versions.
    pub fn reason_label(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Override the creation time (backfill, restore, tests).
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> AuditResult<AuditRecord> {
        if self.stock_before.is_none() && self.stock_after.is_none() {
            return Err(AuditError::missing_attribution(format!(
                "record for product {} has neither stock_before nor stock_after",
                self.product.id
            )));
        }

        let stock_change = match (self.stock_before, self.stock_after) {
            (Some(before), Some(after)) => Some(after.checked_sub(before).ok_or_else(|| {
                AuditError::validation(format!("stock change {before} -> {after} overflows"))
            })?),
            _ => None,
        };

        Ok(AuditRecord {
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            product_sku: self.product.sku,
            product_id: self.product.id,
            order_id: self.order_id,
            user_id: self.user_id,
            stock_before: self.stock_before,
            stock_after: self.stock_after,
            stock_change,
            reason: self.reason,
            notes: self.notes,
        })
    }
}

/// An audit record after the store assigned its surrogate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAuditRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: AuditRecord,
}

impl StoredAuditRecord {
    pub fn new(id: RecordId, record: AuditRecord) -> Self {
        Self { id, record }
    }
}
