use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use invtrack_audit::{AuditRecord, StoredAuditRecord};
use invtrack_core::{OrderId, ProductId};

/// Audit store operation error.
///
/// Infrastructure failures only. A failed write is logged by the caller and
/// never propagated into the stock operation that triggered it.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),

    #[error("audit store rejected record: {0}")]
    Constraint(String),

    #[error("audit storage error: {0}")]
    Storage(String),
}

/// Default page size of the audit history screen.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Hard cap on a single page.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Pagination parameters for audit queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0),
        }
    }

    /// 1-based page number, as list screens count pages.
    pub fn page(page: u32, per_page: u32) -> Self {
        let limit = per_page.clamp(1, MAX_PAGE_SIZE);
        Self {
            limit,
            offset: page.max(1).saturating_sub(1).saturating_mul(limit),
        }
    }
}

/// Filter criteria for audit queries. Empty fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Exact product id.
    pub product_id: Option<ProductId>,
    /// Case-insensitive substring of the SKU.
    pub product_sku: Option<String>,
    /// Exact order (or purchase order) id.
    pub order_id: Option<OrderId>,
    /// Only records whose UTC date is on or before this day.
    pub on_or_before: Option<NaiveDate>,
}

impl AuditFilter {
    pub fn by_product(product_id: ProductId) -> Self {
        Self {
            product_id: Some(product_id),
            ..Default::default()
        }
    }

    pub fn by_sku(sku: impl Into<String>) -> Self {
        Self {
            product_sku: Some(sku.into()),
            ..Default::default()
        }
    }

    pub fn by_order(order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Evaluate the filter in memory (same semantics as the SQL stores).
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(id) = self.product_id {
            if record.product_id() != id {
                return false;
            }
        }
        if let Some(needle) = self.product_sku.as_deref() {
            let needle = needle.to_lowercase();
            match record.product_sku() {
                Some(sku) if sku.to_lowercase().contains(&needle) => {}
                _ => return false,
            }
        }
        if let Some(order_id) = self.order_id {
            if record.order_id() != Some(order_id) {
                return false;
            }
        }
        if let Some(date) = self.on_or_before {
            if record.timestamp().date_naive() > date {
                return false;
            }
        }
        true
    }
}

/// One page of audit history.
#[derive(Debug, Clone, Serialize)]
pub struct AuditPage {
    /// Records on this page, newest first.
    pub items: Vec<StoredAuditRecord>,
    /// Total number of records matching the filter (across all pages).
    pub total_count: u64,
    /// Pagination parameters used.
    pub pagination: Pagination,
    /// Whether more records follow this page.
    pub has_more: bool,
}

impl AuditPage {
    pub fn new(items: Vec<StoredAuditRecord>, total_count: u64, pagination: Pagination) -> Self {
        let has_more = total_count > u64::from(pagination.offset) + u64::from(pagination.limit);
        Self {
            items,
            total_count,
            pagination,
            has_more,
        }
    }

    pub fn total_pages(&self) -> u64 {
        let limit = u64::from(self.pagination.limit.max(1));
        self.total_count.div_ceil(limit)
    }
}

/// Append-only audit log.
///
/// ## Append Semantics
///
/// `append()` assigns the surrogate id and persists the record as is. Records
/// are never updated or deleted. Concurrent appends must not lose records.
///
/// ## Query Semantics
///
/// `query()` returns records matching the filter ordered by timestamp
/// descending, newest insert first among equal timestamps, plus the total
/// match count regardless of pagination.
pub trait AuditStore: Send + Sync {
    fn append(&self, record: AuditRecord) -> Result<StoredAuditRecord, PersistenceError>;

    fn query(&self, filter: &AuditFilter, pagination: Pagination) -> Result<AuditPage, PersistenceError>;
}

impl<S> AuditStore for Arc<S>
where
    S: AuditStore + ?Sized,
{
    fn append(&self, record: AuditRecord) -> Result<StoredAuditRecord, PersistenceError> {
        (**self).append(record)
    }

    fn query(&self, filter: &AuditFilter, pagination: Pagination) -> Result<AuditPage, PersistenceError> {
        (**self).query(filter, pagination)
    }
}
