//! Shop-order stock movements: status transitions and admin line-item edits.
//!
//! The host reports before/after levels directly, so the differ is not
//! consulted. The levels are trusted as given.

use serde::{Deserialize, Serialize};

use invtrack_core::{ActorContext, AuditResult, OrderContext, OrderLine};

use crate::notes::{self, ActorLabel, StockDirection};
use crate::record::{AuditRecord, Reason};

/// Stock level of a product before (`from`) and after (`to`) the host changed it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevels {
    pub from: i64,
    pub to: i64,
}

impl StockLevels {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    pub fn change(&self) -> i64 {
        self.to.saturating_sub(self.from)
    }
}

fn status_change<O, A>(
    reason: Reason,
    direction: StockDirection,
    line: &OrderLine,
    levels: StockLevels,
    order: &O,
    actor: &A,
) -> AuditResult<AuditRecord>
where
    O: OrderContext + ?Sized,
    A: ActorContext + ?Sized,
{
    let note = notes::order_status_change(
        ActorLabel::from_admin_flag(actor.is_admin_context()),
        &order.status(),
        direction,
        line.product.sku_label(),
        line.quantity,
    );

    AuditRecord::builder(line.product.clone())
        .levels(Some(levels.from), Some(levels.to))
        .order(order.order_id())
        .user(actor.current_user_id())
        .reason(reason)
        .notes(note)
        .build()
}

/// Order moved to a stock-reducing status (e.g. pending → processing).
pub fn order_stock_reduced<O, A>(
    line: &OrderLine,
    levels: StockLevels,
    order: &O,
    actor: &A,
) -> AuditResult<AuditRecord>
where
    O: OrderContext + ?Sized,
    A: ActorContext + ?Sized,
{
    status_change(Reason::OrderStockReduced, StockDirection::Decrease, line, levels, order, actor)
}

/// Order moved to a stock-restoring status (e.g. processing → cancelled).
pub fn order_stock_restored<O, A>(
    line: &OrderLine,
    levels: StockLevels,
    order: &O,
    actor: &A,
) -> AuditResult<AuditRecord>
where
    O: OrderContext + ?Sized,
    A: ActorContext + ?Sized,
{
    status_change(Reason::OrderStockRestored, StockDirection::Increase, line, levels, order, actor)
}

/// Admin deleted a line item whose stock had already been reduced.
///
/// Without a reported stock change there is nothing to record.
pub fn line_item_removed<O, A>(
    line: &OrderLine,
    levels: Option<StockLevels>,
    order: &O,
    actor: &A,
) -> AuditResult<Option<AuditRecord>>
where
    O: OrderContext + ?Sized,
    A: ActorContext + ?Sized,
{
    let Some(levels) = levels else {
        return Ok(None);
    };

    AuditRecord::builder(line.product.clone())
        .levels(Some(levels.from), Some(levels.to))
        .order(order.order_id())
        .user(actor.current_user_id())
        .reason(Reason::LineItemDeleted)
        .notes(notes::line_item_deleted(line.product.sku_label(), line.quantity))
        .build()
        .map(Some)
}

/// Admin changed the quantity of a line item and the host adjusted stock to match.
///
/// `line.quantity` is the new line quantity; the previous one is recovered
/// from the stock change.
pub fn line_item_updated<O, A>(
    line: &OrderLine,
    levels: Option<StockLevels>,
    order: &O,
    actor: &A,
) -> AuditResult<Option<AuditRecord>>
where
    O: OrderContext + ?Sized,
    A: ActorContext + ?Sized,
{
    let Some(levels) = levels else {
        return Ok(None);
    };
    let previous_quantity = line.quantity.saturating_add(levels.change());

    AuditRecord::builder(line.product.clone())
        .levels(Some(levels.from), Some(levels.to))
        .order(order.order_id())
        .user(actor.current_user_id())
        .reason(Reason::LineItemUpdated)
        .notes(notes::line_item_updated(
            line.product.sku_label(),
            previous_quantity,
            line.quantity,
        ))
        .build()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use invtrack_core::memory::{CatalogProduct, StaticActor, StaticOrder};
    use invtrack_core::{OrderId, ProductId, UserId};

    fn line(qty: i64) -> OrderLine {
        CatalogProduct::tracked(ProductId::new(5), "TSHIRT", 0).line(qty)
    }

    fn order(status: &str) -> StaticOrder {
        StaticOrder::new(OrderId::new(1001), status, vec![line(2)])
    }

    #[test]
    fn storefront_reduction_is_attributed_to_customer() {
        let record = order_stock_reduced(
            &line(2),
            StockLevels::new(20, 18),
            &order("processing"),
            &StaticActor::guest(),
        )
        .unwrap();

        assert_eq!(record.reason(), Some("Order stock reduced"));
        assert_eq!(record.order_id(), Some(OrderId::new(1001)));
        assert_eq!(record.stock_change(), Some(-2));
        assert_eq!(record.user_id(), UserId::GUEST);
        assert_eq!(
            record.notes(),
            Some("Customer updated order to \"processing\" status reducing stock for TSHIRT by 2")
        );
    }

    #[test]
    fn admin_restoration_is_attributed_to_admin() {
        let record = order_stock_restored(
            &line(2),
            StockLevels::new(18, 20),
            &order("cancelled"),
            &StaticActor::admin(UserId::new(4)),
        )
        .unwrap();

        assert_eq!(record.reason(), Some("Order stock restored"));
        assert_eq!(record.stock_change(), Some(2));
        assert_eq!(record.user_id(), UserId::new(4));
        assert!(record.notes().unwrap().starts_with("Admin updated order to \"cancelled\""));
    }

    #[test]
    fn line_item_removal_without_change_is_a_no_op() {
        let out = line_item_removed(&line(3), None, &order("processing"), &StaticActor::admin(UserId::new(1)))
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn line_item_removal_records_restored_stock() {
        let record = line_item_removed(
            &line(3),
            Some(StockLevels::new(7, 10)),
            &order("processing"),
            &StaticActor::admin(UserId::new(1)),
        )
        .unwrap()
        .unwrap();

        assert_eq!(record.reason(), Some("Order Line Item Deleted"));
        assert_eq!(record.stock_change(), Some(3));
        assert_eq!(record.notes(), Some("Admin deleted line item for TSHIRT with quantity 3"));
    }

    #[test]
    fn line_item_update_reports_previous_line_quantity() {
        // Line went from 2 to 5 units: stock dropped by 3.
        let record = line_item_updated(
            &line(5),
            Some(StockLevels::new(10, 7)),
            &order("processing"),
            &StaticActor::admin(UserId::new(1)),
        )
        .unwrap()
        .unwrap();

        assert_eq!(record.reason(), Some("Order Line Item Updated"));
        assert_eq!(record.notes(), Some("Admin updated line item for TSHIRT from 2 to 5"));
    }
}
