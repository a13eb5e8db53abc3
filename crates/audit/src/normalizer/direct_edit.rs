//! Admin-panel edits: product editor, quick edit, bulk edit.

use invtrack_core::{ActorContext, AuditResult, Catalog, ProductSnapshotSource, StockSnapshot};

use crate::cache::SnapshotCache;
use crate::differ;
use crate::record::{AuditRecord, AuditRecordBuilder, Reason};

/// Admin UI surface an edit was submitted from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EditSurface {
    ProductEditor,
    QuickEdit,
    BulkEdit,
}

impl EditSurface {
    pub fn reason(self) -> Reason {
        match self {
            EditSurface::ProductEditor => Reason::ProductEditor,
            EditSurface::QuickEdit => Reason::QuickEdit,
            EditSurface::BulkEdit => Reason::BulkEdit,
        }
    }
}

fn edited<P, A>(
    surface: EditSurface,
    edited: &P,
    previous: &StockSnapshot,
    actor: &A,
) -> AuditResult<Option<AuditRecord>>
where
    P: ProductSnapshotSource + ?Sized,
    A: ActorContext + ?Sized,
{
    let identity = edited.product_ref();
    let Some(delta) = differ::diff(&edited.stock_snapshot(), previous, &identity)? else {
        return Ok(None);
    };

    AuditRecordBuilder::from_delta(delta)
        .reason(surface.reason())
        .user(actor.current_user_id())
        .build()
        .map(Some)
}

/// Product editor save: compare the submitted product against the stored copy.
///
/// A product the catalog does not know yet (first save) has nothing to compare against.
pub fn product_editor_saved<P, C, A>(
    submitted: &P,
    catalog: &C,
    actor: &A,
) -> AuditResult<Option<AuditRecord>>
where
    P: ProductSnapshotSource + ?Sized,
    C: Catalog + ?Sized,
    A: ActorContext + ?Sized,
{
    let Some(stored) = catalog.get_product(submitted.product_id()) else {
        return Ok(None);
    };
    edited(EditSurface::ProductEditor, submitted, &stored.stock_snapshot(), actor)
}

/// Quick or bulk edit save: compare against the snapshot captured before the edit.
///
/// Products that were never captured in this operation are ignored.
pub fn edited_from_cache<P, A>(
    surface: EditSurface,
    saved: &P,
    cache: &mut SnapshotCache,
    actor: &A,
) -> AuditResult<Option<AuditRecord>>
where
    P: ProductSnapshotSource + ?Sized,
    A: ActorContext + ?Sized,
{
    let Some(captured) = cache.take(saved.product_id()) else {
        return Ok(None);
    };
    edited(surface, saved, &captured.snapshot, actor)
}
