//! Capability traits over the host catalog, order and session objects.
//!
//! The audit core never sees the host's own product or order types. Adapters
//! over the real host implement these narrow interfaces instead.

use std::sync::Arc;

use crate::id::{OrderId, ProductId, UserId};
use crate::snapshot::{ProductRef, StockSnapshot};

/// Anything that can report a product's identity and stock-tracking state.
pub trait ProductSnapshotSource {
    fn product_id(&self) -> ProductId;

    fn sku(&self) -> Option<String>;

    fn stock_snapshot(&self) -> StockSnapshot;

    fn product_ref(&self) -> ProductRef {
        ProductRef::new(self.product_id(), self.sku())
    }
}

impl<P> ProductSnapshotSource for &P
where
    P: ProductSnapshotSource + ?Sized,
{
    fn product_id(&self) -> ProductId {
        (**self).product_id()
    }

    fn sku(&self) -> Option<String> {
        (**self).sku()
    }

    fn stock_snapshot(&self) -> StockSnapshot {
        (**self).stock_snapshot()
    }
}

/// Read access to the host catalog.
pub trait Catalog: Send + Sync {
    type Product: ProductSnapshotSource;

    /// Fetch the current stored state of a product.
    fn get_product(&self, id: ProductId) -> Option<Self::Product>;

    fn get_product_id_by_sku(&self, sku: &str) -> Option<ProductId>;
}

impl<C> Catalog for Arc<C>
where
    C: Catalog + ?Sized,
{
    type Product = C::Product;

    fn get_product(&self, id: ProductId) -> Option<Self::Product> {
        (**self).get_product(id)
    }

    fn get_product_id_by_sku(&self, sku: &str) -> Option<ProductId> {
        (**self).get_product_id_by_sku(sku)
    }
}

/// One line of an order as the audit core needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product: ProductRef,
    /// Ordered quantity of the line (not a stock level).
    pub quantity: i64,
}

/// Read access to a shop order or an external purchase order.
pub trait OrderContext {
    fn order_id(&self) -> OrderId;

    /// Host status slug, e.g. `processing` or `cancelled`.
    fn status(&self) -> String;

    fn items(&self) -> Vec<OrderLine>;
}

impl<O> OrderContext for &O
where
    O: OrderContext + ?Sized,
{
    fn order_id(&self) -> OrderId {
        (**self).order_id()
    }

    fn status(&self) -> String {
        (**self).status()
    }

    fn items(&self) -> Vec<OrderLine> {
        (**self).items()
    }
}

/// The session an event is being handled in.
pub trait ActorContext {
    /// Acting user; `UserId::GUEST` when nobody is logged in.
    fn current_user_id(&self) -> UserId;

    /// True for admin-panel requests, false for storefront/customer requests.
    fn is_admin_context(&self) -> bool;
}

impl<A> ActorContext for &A
where
    A: ActorContext + ?Sized,
{
    fn current_user_id(&self) -> UserId {
        (**self).current_user_id()
    }

    fn is_admin_context(&self) -> bool {
        (**self).is_admin_context()
    }
}
