//! External purchase orders (receiving or returning stock through a PO plugin).
//!
//! Two phases: capture every PO line's product before the plugin applies
//! stock levels, then re-read and diff each one afterwards.

use invtrack_core::{ActorContext, Catalog, OrderContext, ProductSnapshotSource};

use super::NormalizedBatch;
use crate::cache::SnapshotCache;
use crate::differ;
use crate::notes::{self, StockDirection};
use crate::record::{AuditRecordBuilder, Reason};

/// Before-hook: capture the current state of every product on the PO.
///
/// Returns how many products were newly captured.
pub fn capture_purchase_order<O, C>(order: &O, catalog: &C, cache: &mut SnapshotCache) -> usize
where
    O: OrderContext + ?Sized,
    C: Catalog + ?Sized,
{
    order
        .items()
        .iter()
        .filter(|line| cache.capture_from(catalog, line.product.id))
        .count()
}

/// After-hook: the plugin applied the PO's stock levels.
pub fn purchase_order_applied<O, C, A>(
    order: &O,
    direction: StockDirection,
    catalog: &C,
    cache: &mut SnapshotCache,
    actor: &A,
) -> NormalizedBatch
where
    O: OrderContext + ?Sized,
    C: Catalog + ?Sized,
    A: ActorContext + ?Sized,
{
    let status = order.status();
    let mut batch = NormalizedBatch::default();

    for line in order.items() {
        let id = line.product.id;
        let Some(captured) = cache.take(id) else {
            batch.skipped.push(id);
            continue;
        };
        let Some(product) = catalog.get_product(id) else {
            batch.skipped.push(id);
            continue;
        };

        let identity = product.product_ref();
        let delta = match differ::diff(&product.stock_snapshot(), &captured.snapshot, &identity) {
            Ok(Some(delta)) => delta,
            Ok(None) => continue,
            Err(err) => {
                batch.rejected.push((id, err));
                continue;
            }
        };

        let note = notes::purchase_order(&status, direction, identity.sku_label(), line.quantity);
        match AuditRecordBuilder::from_delta(delta)
            .reason(Reason::ExternalPurchaseOrder)
            .order(order.order_id())
            .user(actor.current_user_id())
            .notes(note)
            .build()
        {
            Ok(record) => batch.records.push(record),
            Err(err) => batch.rejected.push((id, err)),
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use invtrack_core::memory::{CatalogProduct, InMemoryCatalog, StaticActor, StaticOrder};
    use invtrack_core::{AuditError, OrderId, ProductId, StockSnapshot, UserId};

    fn po(lines: Vec<invtrack_core::OrderLine>) -> StaticOrder {
        StaticOrder::new(OrderId::new(9001), "received", lines)
    }

    #[test]
    fn received_po_records_increase_per_line() {
        let p42 = CatalogProduct::tracked(ProductId::new(42), "BOLT", 10);
        let catalog = InMemoryCatalog::with_products([p42.clone()]);
        let order = po(vec![p42.line(5)]);
        let actor = StaticActor::admin(UserId::new(1));

        let mut cache = SnapshotCache::new("po-stock");
        assert_eq!(capture_purchase_order(&order, &catalog, &mut cache), 1);

        catalog.set_stock(ProductId::new(42), StockSnapshot::tracked(15));
        let batch = purchase_order_applied(&order, StockDirection::Increase, &catalog, &mut cache, &actor);

        assert_eq!(batch.records.len(), 1);
        let record = &batch.records[0];
        assert_eq!(record.reason(), Some("External PO Update"));
        assert_eq!(record.order_id(), Some(OrderId::new(9001)));
        assert_eq!(record.stock_change(), Some(5));
        assert_eq!(record.notes(), Some("PO set to status \"received\" which increased BOLT stock by 5"));
        assert!(cache.is_empty());
    }

    #[test]
    fn unchanged_uncaptured_and_missing_lines_produce_no_records() {
        let same = CatalogProduct::tracked(ProductId::new(1), "SAME", 4);
        let late = CatalogProduct::tracked(ProductId::new(2), "LATE", 4);
        let gone = CatalogProduct::tracked(ProductId::new(3), "GONE", 4);
        let catalog = InMemoryCatalog::with_products([same.clone(), gone.clone()]);
        let order = po(vec![same.line(1), late.line(1), gone.line(1)]);

        let mut cache = SnapshotCache::new("po-stock");
        capture_purchase_order(&order, &catalog, &mut cache);
        catalog.upsert(late);
        catalog.remove(ProductId::new(3));

        let batch = purchase_order_applied(
            &order,
            StockDirection::Decrease,
            &catalog,
            &mut cache,
            &StaticActor::admin(UserId::new(1)),
        );

        assert!(batch.records.is_empty());
        assert!(batch.rejected.is_empty());
        assert_eq!(batch.skipped, vec![ProductId::new(2), ProductId::new(3)]);
        // Snapshots of products deleted mid-operation are consumed too.
        assert!(cache.is_empty());
    }

    #[test]
    fn broken_snapshot_is_rejected_without_stopping_the_batch() {
        let broken = CatalogProduct::tracked(ProductId::new(1), "BROKEN", 4);
        let fine = CatalogProduct::tracked(ProductId::new(2), "FINE", 4);
        let catalog = InMemoryCatalog::with_products([broken.clone(), fine.clone()]);
        let order = po(vec![broken.line(1), fine.line(2)]);

        let mut cache = SnapshotCache::new("po-stock");
        capture_purchase_order(&order, &catalog, &mut cache);
        catalog.set_stock(
            ProductId::new(1),
            StockSnapshot {
                tracking_enabled: true,
                quantity: None,
            },
        );
        catalog.set_stock(ProductId::new(2), StockSnapshot::tracked(2));

        let batch = purchase_order_applied(
            &order,
            StockDirection::Decrease,
            &catalog,
            &mut cache,
            &StaticActor::admin(UserId::new(1)),
        );

        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].stock_change(), Some(-2));
        assert!(matches!(batch.rejected[0], (id, AuditError::InvalidSnapshot(_)) if id == ProductId::new(1)));
    }
}
