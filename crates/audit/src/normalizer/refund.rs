//! Refund restock.

use invtrack_core::{ActorContext, AuditResult, OrderContext, ProductSnapshotSource};

use crate::notes;
use crate::record::{AuditRecord, Reason};

/// Refunded items were put back into stock.
///
/// Identity comes from `product`. Equal old/new levels mean nothing was restocked.
pub fn refund_restock<P, O, A>(
    product: &P,
    old_stock: i64,
    new_stock: i64,
    order: &O,
    actor: &A,
) -> AuditResult<Option<AuditRecord>>
where
    P: ProductSnapshotSource + ?Sized,
    O: OrderContext + ?Sized,
    A: ActorContext + ?Sized,
{
    if old_stock == new_stock {
        return Ok(None);
    }
    let identity = product.product_ref();
    let note = notes::refund_restock(new_stock.saturating_sub(old_stock), identity.sku_label());

    AuditRecord::builder(identity)
        .levels(Some(old_stock), Some(new_stock))
        .order(order.order_id())
        .user(actor.current_user_id())
        .reason(Reason::OrderRefund)
        .notes(note)
        .build()
        .map(Some)
}
