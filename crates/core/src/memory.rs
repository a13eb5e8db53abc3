//! In-memory host doubles.
//!
//! Intended for tests/dev: a catalog, an order and a session that satisfy the
//! capability traits without a real shop behind them.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::host::{ActorContext, Catalog, OrderContext, OrderLine, ProductSnapshotSource};
use crate::id::{OrderId, ProductId, UserId};
use crate::snapshot::{ProductRef, StockSnapshot};

/// Plain product record held by [`InMemoryCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub sku: Option<String>,
    pub stock: StockSnapshot,
}

impl CatalogProduct {
    pub fn tracked(id: ProductId, sku: &str, quantity: i64) -> Self {
        Self {
            id,
            sku: Some(sku.to_string()),
            stock: StockSnapshot::tracked(quantity),
        }
    }

    pub fn untracked(id: ProductId, sku: &str) -> Self {
        Self {
            id,
            sku: Some(sku.to_string()),
            stock: StockSnapshot::untracked(),
        }
    }

    pub fn line(&self, quantity: i64) -> OrderLine {
        OrderLine {
            product: ProductRef::new(self.id, self.sku.clone()),
            quantity,
        }
    }
}

impl ProductSnapshotSource for CatalogProduct {
    fn product_id(&self) -> ProductId {
        self.id
    }

    fn sku(&self) -> Option<String> {
        self.sku.clone()
    }

    fn stock_snapshot(&self) -> StockSnapshot {
        self.stock
    }
}

/// Mutable in-memory catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, CatalogProduct>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = CatalogProduct>) -> Self {
        let catalog = Self::new();
        for p in products {
            catalog.upsert(p);
        }
        catalog
    }

    pub fn upsert(&self, product: CatalogProduct) {
        if let Ok(mut map) = self.products.write() {
            map.insert(product.id, product);
        }
    }

    /// Overwrite the stock state of an existing product. Unknown ids are ignored.
    pub fn set_stock(&self, id: ProductId, stock: StockSnapshot) {
        if let Ok(mut map) = self.products.write() {
            if let Some(p) = map.get_mut(&id) {
                p.stock = stock;
            }
        }
    }

    pub fn remove(&self, id: ProductId) {
        if let Ok(mut map) = self.products.write() {
            map.remove(&id);
        }
    }
}

impl Catalog for InMemoryCatalog {
    type Product = CatalogProduct;

    fn get_product(&self, id: ProductId) -> Option<CatalogProduct> {
        let map = self.products.read().ok()?;
        map.get(&id).cloned()
    }

    fn get_product_id_by_sku(&self, sku: &str) -> Option<ProductId> {
        let map = self.products.read().ok()?;
        map.values()
            .find(|p| p.sku.as_deref() == Some(sku))
            .map(|p| p.id)
    }
}

/// Fixed order snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticOrder {
    pub id: OrderId,
    pub status: String,
    pub lines: Vec<OrderLine>,
}

impl StaticOrder {
    pub fn new(id: OrderId, status: &str, lines: Vec<OrderLine>) -> Self {
        Self {
            id,
            status: status.to_string(),
            lines,
        }
    }
}

impl OrderContext for StaticOrder {
    fn order_id(&self) -> OrderId {
        self.id
    }

    fn status(&self) -> String {
        self.status.clone()
    }

    fn items(&self) -> Vec<OrderLine> {
        self.lines.clone()
    }
}

/// Fixed session identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StaticActor {
    pub user_id: UserId,
    pub admin: bool,
}

impl StaticActor {
    pub fn admin(user_id: UserId) -> Self {
        Self { user_id, admin: true }
    }

    pub fn customer(user_id: UserId) -> Self {
        Self { user_id, admin: false }
    }

    pub fn guest() -> Self {
        Self::customer(UserId::GUEST)
    }
}

impl ActorContext for StaticActor {
    fn current_user_id(&self) -> UserId {
        self.user_id
    }

    fn is_admin_context(&self) -> bool {
        self.admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup_by_id_and_sku() {
        let catalog = InMemoryCatalog::with_products([
            CatalogProduct::tracked(ProductId::new(1), "ABC-1", 5),
            CatalogProduct::untracked(ProductId::new(2), "XYZ"),
        ]);

        assert_eq!(catalog.get_product_id_by_sku("XYZ"), Some(ProductId::new(2)));
        assert_eq!(catalog.get_product_id_by_sku("nope"), None);
        assert_eq!(
            catalog.get_product(ProductId::new(1)).unwrap().stock_snapshot(),
            StockSnapshot::tracked(5)
        );
    }

    #[test]
    fn set_stock_updates_existing_products_only() {
        let catalog = InMemoryCatalog::with_products([CatalogProduct::tracked(ProductId::new(1), "A", 5)]);
        catalog.set_stock(ProductId::new(1), StockSnapshot::tracked(9));
        catalog.set_stock(ProductId::new(99), StockSnapshot::tracked(9));

        assert_eq!(catalog.get_product(ProductId::new(1)).unwrap().stock.quantity, Some(9));
        assert!(catalog.get_product(ProductId::new(99)).is_none());
    }
}
