//! External stock-central bulk edit: a batch of product id → proposed meta.

use serde::{Deserialize, Serialize};

use invtrack_core::{ActorContext, Catalog, ProductId, ProductSnapshotSource};

use super::NormalizedBatch;
use crate::cache::SnapshotCache;
use crate::differ;
use crate::notes;
use crate::record::{AuditRecordBuilder, Reason};

/// One entry of a stock-central save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedStock {
    pub product_id: ProductId,
    /// Stock value typed into the grid, as submitted. Absent when only other meta changed.
    pub stock: Option<String>,
}

/// Before-hook: capture every product in the batch.
pub fn capture_stock_central<C>(batch: &[ProposedStock], catalog: &C, cache: &mut SnapshotCache) -> usize
where
    C: Catalog + ?Sized,
{
    batch
        .iter()
        .filter(|entry| cache.capture_from(catalog, entry.product_id))
        .count()
}

/// After-hook: the batch was written; diff each product against its capture.
pub fn stock_central_applied<C, A>(
    batch: &[ProposedStock],
    catalog: &C,
    cache: &mut SnapshotCache,
    actor: &A,
) -> NormalizedBatch
where
    C: Catalog + ?Sized,
    A: ActorContext + ?Sized,
{
    let mut out = NormalizedBatch::default();

    for entry in batch {
        let id = entry.product_id;
        let Some(captured) = cache.take(id) else {
            out.skipped.push(id);
            continue;
        };
        let Some(product) = catalog.get_product(id) else {
            out.skipped.push(id);
            continue;
        };

        let identity = product.product_ref();
        let delta = match differ::diff(&product.stock_snapshot(), &captured.snapshot, &identity) {
            Ok(Some(delta)) => delta,
            Ok(None) => continue,
            Err(err) => {
                out.rejected.push((id, err));
                continue;
            }
        };

        let mut builder = AuditRecordBuilder::from_delta(delta)
            .reason(Reason::ExternalStockCentral)
            .user(actor.current_user_id());
        if let Some(proposed) = entry.stock.as_deref() {
            builder = builder.notes(notes::stock_central(identity.sku_label(), proposed));
        }

        match builder.build() {
            Ok(record) => out.records.push(record),
            Err(err) => out.rejected.push((id, err)),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use invtrack_core::memory::{CatalogProduct, InMemoryCatalog, StaticActor};
    use invtrack_core::{StockSnapshot, UserId};

    #[test]
    fn grid_save_records_changed_products_only() {
        let catalog = InMemoryCatalog::with_products([
            CatalogProduct::tracked(ProductId::new(1), "A", 10),
            CatalogProduct::tracked(ProductId::new(2), "B", 10),
        ]);
        let batch = vec![
            ProposedStock {
                product_id: ProductId::new(1),
                stock: Some("4".to_string()),
            },
            ProposedStock {
                product_id: ProductId::new(2),
                stock: Some("10".to_string()),
            },
        ];

        let mut cache = SnapshotCache::new("stock-central");
        assert_eq!(capture_stock_central(&batch, &catalog, &mut cache), 2);
        catalog.set_stock(ProductId::new(1), StockSnapshot::tracked(4));

        let out = stock_central_applied(&batch, &catalog, &mut cache, &StaticActor::admin(UserId::new(3)));
        assert_eq!(out.records.len(), 1);
        let record = &out.records[0];
        assert_eq!(record.reason(), Some("External Stock Central Edit"));
        assert_eq!(record.stock_change(), Some(-6));
        assert_eq!(record.notes(), Some("Stock for A was set to 4 in Stock Central"));
        assert!(cache.is_empty());
    }

    #[test]
    fn tracking_toggle_without_proposed_stock_keeps_differ_note() {
        let catalog = InMemoryCatalog::with_products([CatalogProduct::untracked(ProductId::new(1), "A")]);
        let batch = vec![ProposedStock {
            product_id: ProductId::new(1),
            stock: None,
        }];

        let mut cache = SnapshotCache::new("stock-central");
        capture_stock_central(&batch, &catalog, &mut cache);
        catalog.set_stock(ProductId::new(1), StockSnapshot::tracked(8));

        let out = stock_central_applied(&batch, &catalog, &mut cache, &StaticActor::admin(UserId::new(3)));
        assert_eq!(out.records[0].notes(), Some("stock tracking enabled for A"));
        assert_eq!(out.records[0].stock_after(), Some(8));
    }

    #[test]
    fn product_deleted_mid_save_is_skipped_and_its_snapshot_consumed() {
        let catalog = InMemoryCatalog::with_products([CatalogProduct::tracked(ProductId::new(1), "A", 10)]);
        let batch = vec![ProposedStock {
            product_id: ProductId::new(1),
            stock: Some("3".to_string()),
        }];

        let mut cache = SnapshotCache::new("stock-central");
        capture_stock_central(&batch, &catalog, &mut cache);
        catalog.remove(ProductId::new(1));

        let out = stock_central_applied(&batch, &catalog, &mut cache, &StaticActor::admin(UserId::new(3)));
        assert!(out.records.is_empty());
        assert_eq!(out.skipped, vec![ProductId::new(1)]);
        assert!(cache.is_empty());
    }
}
