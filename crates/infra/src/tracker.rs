//! Tracker: one entry point per host stock hook.
//!
//! Each entry point runs the matching normalizer adapter and hands the result
//! to the [`UpdateManager`]. Nothing here returns an error: an unreadable
//! snapshot or a failed write is logged and the host's own stock operation
//! proceeds untouched.
//!
//! Two-phase hooks (quick/bulk edit, purchase orders, stock central) are
//! bracketed by a [`CaptureSession`]. The session owns the snapshot cache of
//! that one operation; the closing call consumes it.

use tracing::{debug, warn};

use invtrack_audit::normalizer::{self, EditSurface, ProposedStock, StockLevels};
use invtrack_audit::{AuditRecord, NormalizedBatch, OperationScope, SnapshotCache, StockDirection};
use invtrack_core::{
    ActorContext, AuditResult, Catalog, OrderContext, OrderLine, ProductId, ProductSnapshotSource, RecordId,
};

use crate::manager::UpdateManager;
use crate::store::AuditStore;

/// Captured "before" state of one two-phase operation.
#[derive(Debug)]
pub struct CaptureSession {
    cache: SnapshotCache,
}

impl CaptureSession {
    fn new(label: &str) -> Self {
        Self {
            cache: SnapshotCache::new(label),
        }
    }

    pub fn scope(&self) -> &OperationScope {
        self.cache.scope()
    }

    /// Number of products captured and not yet compared.
    pub fn pending(&self) -> usize {
        self.cache.len()
    }
}

/// Open quick or bulk edit. Every save in it is attributed to its surface.
#[derive(Debug)]
pub struct EditSession {
    surface: EditSurface,
    capture: CaptureSession,
}

impl EditSession {
    pub fn surface(&self) -> EditSurface {
        self.surface
    }

    pub fn pending(&self) -> usize {
        self.capture.pending()
    }
}

pub struct InventoryTracker<S, C> {
    manager: UpdateManager<S>,
    catalog: C,
}

impl<S, C> InventoryTracker<S, C>
where
    S: AuditStore,
    C: Catalog,
{
    pub fn new(manager: UpdateManager<S>, catalog: C) -> Self {
        Self { manager, catalog }
    }

    pub fn manager(&self) -> &UpdateManager<S> {
        &self.manager
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Full product editor save; `submitted` is the state about to be written.
    pub fn product_editor_saved<P, A>(&self, submitted: &P, actor: &A) -> Option<RecordId>
    where
        P: ProductSnapshotSource + ?Sized,
        A: ActorContext + ?Sized,
    {
        let outcome = normalizer::product_editor_saved(submitted, &self.catalog, actor);
        self.persist("product_editor", outcome)
    }

    /// Open a quick or bulk edit. Capture each product before it is written.
    pub fn begin_admin_edit(&self, surface: EditSurface) -> EditSession {
        EditSession {
            surface,
            capture: CaptureSession::new(surface.reason().as_str()),
        }
    }

    pub fn capture_for_edit(&self, session: &mut EditSession, product_id: ProductId) -> bool {
        session.capture.cache.capture_from(&self.catalog, product_id)
    }

    /// A product of an open quick or bulk edit was saved.
    pub fn admin_edit_saved<P, A>(&self, session: &mut EditSession, saved: &P, actor: &A) -> Option<RecordId>
    where
        P: ProductSnapshotSource + ?Sized,
        A: ActorContext + ?Sized,
    {
        let surface = session.surface;
        let outcome = normalizer::edited_from_cache(surface, saved, &mut session.capture.cache, actor);
        self.persist(surface.reason().as_str(), outcome)
    }

    /// Close a quick or bulk edit.
    pub fn end_admin_edit(&self, session: EditSession) {
        self.close(session.capture);
    }

    pub fn order_stock_reduced<O, A>(
        &self,
        line: &OrderLine,
        levels: StockLevels,
        order: &O,
        actor: &A,
    ) -> Option<RecordId>
    where
        O: OrderContext + ?Sized,
        A: ActorContext + ?Sized,
    {
        let outcome = normalizer::order_stock_reduced(line, levels, order, actor).map(Some);
        self.persist("order_stock_reduced", outcome)
    }

    pub fn order_stock_restored<O, A>(
        &self,
        line: &OrderLine,
        levels: StockLevels,
        order: &O,
        actor: &A,
    ) -> Option<RecordId>
    where
        O: OrderContext + ?Sized,
        A: ActorContext + ?Sized,
    {
        let outcome = normalizer::order_stock_restored(line, levels, order, actor).map(Some);
        self.persist("order_stock_restored", outcome)
    }

    /// Admin deleted a line item. `levels` is `None` when the host adjusted no stock.
    pub fn line_item_removed<O, A>(
        &self,
        line: &OrderLine,
        levels: Option<StockLevels>,
        order: &O,
        actor: &A,
    ) -> Option<RecordId>
    where
        O: OrderContext + ?Sized,
        A: ActorContext + ?Sized,
    {
        let outcome = normalizer::line_item_removed(line, levels, order, actor);
        self.persist("line_item_removed", outcome)
    }

    pub fn line_item_updated<O, A>(
        &self,
        line: &OrderLine,
        levels: Option<StockLevels>,
        order: &O,
        actor: &A,
    ) -> Option<RecordId>
    where
        O: OrderContext + ?Sized,
        A: ActorContext + ?Sized,
    {
        let outcome = normalizer::line_item_updated(line, levels, order, actor);
        self.persist("line_item_updated", outcome)
    }

    pub fn refund_restocked<P, O, A>(
        &self,
        product: &P,
        old_stock: i64,
        new_stock: i64,
        order: &O,
        actor: &A,
    ) -> Option<RecordId>
    where
        P: ProductSnapshotSource + ?Sized,
        O: OrderContext + ?Sized,
        A: ActorContext + ?Sized,
    {
        let outcome = normalizer::refund_restock(product, old_stock, new_stock, order, actor);
        self.persist("refund", outcome)
    }

    /// Before a purchase order touches stock: capture every product on it.
    pub fn begin_purchase_order<O>(&self, order: &O) -> CaptureSession
    where
        O: OrderContext + ?Sized,
    {
        let mut session = CaptureSession::new("purchase_order");
        let captured = normalizer::capture_purchase_order(order, &self.catalog, &mut session.cache);
        debug!(
            operation = %session.scope().id,
            order_id = %order.order_id(),
            captured,
            "purchase order snapshot taken"
        );
        session
    }

    pub fn purchase_order_applied<O, A>(
        &self,
        mut session: CaptureSession,
        order: &O,
        direction: StockDirection,
        actor: &A,
    ) -> Vec<RecordId>
    where
        O: OrderContext + ?Sized,
        A: ActorContext + ?Sized,
    {
        let batch =
            normalizer::purchase_order_applied(order, direction, &self.catalog, &mut session.cache, actor);
        let ids = self.persist_batch("purchase_order", session.scope(), batch);
        self.close(session);
        ids
    }

    pub fn begin_stock_central(&self, batch: &[ProposedStock]) -> CaptureSession {
        let mut session = CaptureSession::new("stock_central");
        let captured = normalizer::capture_stock_central(batch, &self.catalog, &mut session.cache);
        debug!(operation = %session.scope().id, captured, "stock central snapshot taken");
        session
    }

    pub fn stock_central_applied<A>(
        &self,
        mut session: CaptureSession,
        batch: &[ProposedStock],
        actor: &A,
    ) -> Vec<RecordId>
    where
        A: ActorContext + ?Sized,
    {
        let out = normalizer::stock_central_applied(batch, &self.catalog, &mut session.cache, actor);
        let ids = self.persist_batch("stock_central", session.scope(), out);
        self.close(session);
        ids
    }

    fn persist(&self, source: &str, outcome: AuditResult<Option<AuditRecord>>) -> Option<RecordId> {
        match outcome {
            Ok(Some(record)) => self.manager.record_best_effort(source, record),
            Ok(None) => None,
            Err(e) => {
                warn!(source, error = %e, "stock change not audited");
                None
            }
        }
    }

    fn persist_batch(&self, source: &str, scope: &OperationScope, batch: NormalizedBatch) -> Vec<RecordId> {
        for (product_id, e) in &batch.rejected {
            warn!(source, operation = %scope.id, product_id = %product_id, error = %e, "stock change not audited");
        }
        if !batch.skipped.is_empty() {
            debug!(source, operation = %scope.id, skipped = ?batch.skipped, "products without a snapshot");
        }

        batch
            .records
            .into_iter()
            .filter_map(|record| self.manager.record_best_effort(source, record))
            .collect()
    }

    fn close(&self, session: CaptureSession) {
        let scope = session.scope().clone();
        let leftover = session.cache.into_unconsumed();
        if !leftover.is_empty() {
            let ids: Vec<ProductId> = leftover.iter().map(|c| c.product.id).collect();
            debug!(
                operation = %scope.id,
                label = %scope.label,
                unconsumed = ?ids,
                "snapshots captured but never compared"
            );
        }
    }
}
