//! Event normalizer: one adapter per originating event source.
//!
//! Each adapter turns a source-specific payload into zero or one
//! [`AuditRecord`](crate::AuditRecord). "Nothing changed" is `Ok(None)`, never
//! an error. Batch adapters (purchase orders, stock central) report per-item
//! failures in a [`NormalizedBatch`] instead of aborting the whole batch.

pub mod direct_edit;
pub mod order;
pub mod purchase_order;
pub mod refund;
pub mod stock_central;

use invtrack_core::{AuditError, ProductId};

use crate::record::AuditRecord;

pub use direct_edit::{EditSurface, edited_from_cache, product_editor_saved};
pub use order::{
    StockLevels, line_item_removed, line_item_updated, order_stock_reduced, order_stock_restored,
};
pub use purchase_order::{capture_purchase_order, purchase_order_applied};
pub use refund::refund_restock;
pub use stock_central::{ProposedStock, capture_stock_central, stock_central_applied};

/// Outcome of normalizing a multi-product operation.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub records: Vec<AuditRecord>,
    /// Products whose state could not be compared.
    pub rejected: Vec<(ProductId, AuditError)>,
    /// Products that had no captured "before" snapshot or vanished from the catalog.
    pub skipped: Vec<ProductId>,
}
