//! History screen read side: one page of audit rows plus presentation cells.
//!
//! The order column is extensible through [`OrderColumnRenderer`]. The default
//! renderer passes the shop-order cell through unchanged; [`ExternalPoLinks`]
//! re-targets purchase-order ids to the purchase-order editor.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use invtrack_audit::StoredAuditRecord;
use invtrack_core::{Catalog, OrderId, ProductId, ProductSnapshotSource, UserId};

use crate::manager::UpdateManager;
use crate::store::{AuditFilter, AuditStore, Pagination, PersistenceError};

/// Label of the synthetic "current stock" rows.
pub const CURRENT_STOCK_LABEL: &str = "Current Stock";

/// More products than this and the current-stock rows are omitted.
const CURRENT_STOCK_LIMIT: usize = 10;

/// What an order id refers to in the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrderKind {
    ShopOrder,
    PurchaseOrder,
}

/// Order lookup used to render the order column. `None` means deleted.
pub trait OrderDirectory: Send + Sync {
    fn order_kind(&self, order_id: OrderId) -> Option<OrderKind>;
}

/// Fixed directory (tests/dev).
#[derive(Debug, Clone, Default)]
pub struct StaticOrderDirectory {
    shop_orders: HashSet<OrderId>,
    purchase_orders: HashSet<OrderId>,
}

impl StaticOrderDirectory {
    pub fn new(
        shop_orders: impl IntoIterator<Item = OrderId>,
        purchase_orders: impl IntoIterator<Item = OrderId>,
    ) -> Self {
        Self {
            shop_orders: shop_orders.into_iter().collect(),
            purchase_orders: purchase_orders.into_iter().collect(),
        }
    }
}

impl OrderDirectory for StaticOrderDirectory {
    fn order_kind(&self, order_id: OrderId) -> Option<OrderKind> {
        if self.purchase_orders.contains(&order_id) {
            Some(OrderKind::PurchaseOrder)
        } else if self.shop_orders.contains(&order_id) {
            Some(OrderKind::ShopOrder)
        } else {
            None
        }
    }
}

/// Directory for callers with no host order lookup. Every id is taken to be a
/// live shop order unless it is listed as a purchase order, so nothing renders
/// as deleted.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredOrders {
    purchase_orders: HashSet<OrderId>,
}

impl ConfiguredOrders {
    pub fn new(purchase_orders: impl IntoIterator<Item = OrderId>) -> Self {
        Self {
            purchase_orders: purchase_orders.into_iter().collect(),
        }
    }
}

impl OrderDirectory for ConfiguredOrders {
    fn order_kind(&self, order_id: OrderId) -> Option<OrderKind> {
        if self.purchase_orders.contains(&order_id) {
            Some(OrderKind::PurchaseOrder)
        } else {
            Some(OrderKind::ShopOrder)
        }
    }
}

/// Rendered order column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCell {
    pub label: String,
    pub href: Option<String>,
}

impl OrderCell {
    fn shop_order(admin_url: &str, order_id: OrderId) -> Self {
        Self {
            label: order_id.to_string(),
            href: Some(format!("{admin_url}admin.php?page=wc-orders&action=edit&id={order_id}")),
        }
    }

    fn deleted(order_id: OrderId) -> Self {
        Self {
            label: format!("{order_id} (Deleted)"),
            href: None,
        }
    }
}

/// Hook over the order column. Receives the default cell and may replace it.
pub trait OrderColumnRenderer: Send + Sync {
    fn render(&self, order_id: OrderId, default: OrderCell) -> OrderCell;
}

/// Leaves the default cell untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl OrderColumnRenderer for PassThrough {
    fn render(&self, _order_id: OrderId, default: OrderCell) -> OrderCell {
        default
    }
}

/// Links purchase-order ids to the purchase-order editor.
#[derive(Debug, Clone)]
pub struct ExternalPoLinks<D> {
    directory: D,
    admin_url: String,
}

impl<D> ExternalPoLinks<D> {
    pub fn new(directory: D, admin_url: impl Into<String>) -> Self {
        Self {
            directory,
            admin_url: admin_url.into(),
        }
    }
}

impl<D> OrderColumnRenderer for ExternalPoLinks<D>
where
    D: OrderDirectory,
{
    fn render(&self, order_id: OrderId, default: OrderCell) -> OrderCell {
        match self.directory.order_kind(order_id) {
            Some(OrderKind::PurchaseOrder) => OrderCell {
                label: order_id.to_string(),
                href: Some(format!("{}post.php?action=edit&post={order_id}", self.admin_url)),
            },
            _ => default,
        }
    }
}

/// Synthetic top row showing the live stock of a searched product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentStockRow {
    pub timestamp: DateTime<Utc>,
    pub product_sku: Option<String>,
    pub product_id: ProductId,
    pub stock_after: i64,
    pub reason: &'static str,
}

/// Live stock rows for the first page of a product search.
///
/// Only shown when searching by product id or SKU, never with an order or
/// date filter, and never past page one. Untracked products are left out.
pub fn current_stock_rows<C>(catalog: &C, filter: &AuditFilter, pagination: Pagination) -> Vec<CurrentStockRow>
where
    C: Catalog + ?Sized,
{
    if pagination.offset != 0 {
        return Vec::new();
    }
    if filter.product_id.is_none() && filter.product_sku.is_none() {
        return Vec::new();
    }
    if filter.order_id.is_some() || filter.on_or_before.is_some() {
        return Vec::new();
    }

    let mut products = Vec::new();
    if let Some(product) = filter.product_id.and_then(|id| catalog.get_product(id)) {
        products.push(product);
    }
    if let Some(product) = filter
        .product_sku
        .as_deref()
        .and_then(|sku| catalog.get_product_id_by_sku(sku))
        .and_then(|id| catalog.get_product(id))
    {
        products.push(product);
    }
    if products.len() >= CURRENT_STOCK_LIMIT {
        return Vec::new();
    }

    let now = Utc::now();
    products
        .iter()
        .filter_map(|product| {
            let stock = product.stock_snapshot();
            if !stock.tracking_enabled {
                return None;
            }
            Some(CurrentStockRow {
                timestamp: now,
                product_sku: product.sku(),
                product_id: product.product_id(),
                stock_after: stock.quantity?,
                reason: CURRENT_STOCK_LABEL,
            })
        })
        .collect()
}

/// One audit row with its presentation cells.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    #[serde(flatten)]
    pub record: StoredAuditRecord,
    pub order: Option<OrderCell>,
    pub user: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryReport {
    pub current_stock: Vec<CurrentStockRow>,
    pub rows: Vec<HistoryRow>,
    pub total_count: u64,
    pub per_page: u32,
    pub total_pages: u64,
}

/// Renders pages of the audit history screen.
pub struct HistoryScreen<D, R> {
    directory: D,
    renderer: R,
    admin_url: String,
}

impl<D> HistoryScreen<D, PassThrough>
where
    D: OrderDirectory,
{
    pub fn new(directory: D, admin_url: impl Into<String>) -> Self {
        Self {
            directory,
            renderer: PassThrough,
            admin_url: admin_url.into(),
        }
    }
}

impl<D, R> HistoryScreen<D, R>
where
    D: OrderDirectory,
    R: OrderColumnRenderer,
{
    pub fn with_renderer<R2: OrderColumnRenderer>(self, renderer: R2) -> HistoryScreen<D, R2> {
        HistoryScreen {
            directory: self.directory,
            renderer,
            admin_url: self.admin_url,
        }
    }

    /// Build page `page` (1-based) for `filter`.
    pub fn page<S, C>(
        &self,
        manager: &UpdateManager<S>,
        catalog: &C,
        filter: &AuditFilter,
        page: u32,
    ) -> Result<HistoryReport, PersistenceError>
    where
        S: AuditStore,
        C: Catalog + ?Sized,
    {
        let pagination = Pagination::page(page, manager.page_size());
        let result = manager.query(filter, Some(pagination))?;
        let total_pages = result.total_pages();

        let rows = result
            .items
            .into_iter()
            .map(|record| {
                let order = record.record.order_id().map(|id| self.order_cell(id));
                let user = user_label(record.record.user_id());
                HistoryRow { record, order, user }
            })
            .collect();

        Ok(HistoryReport {
            current_stock: current_stock_rows(catalog, filter, pagination),
            rows,
            total_count: result.total_count,
            per_page: pagination.limit,
            total_pages,
        })
    }

    pub fn order_cell(&self, order_id: OrderId) -> OrderCell {
        let default = match self.directory.order_kind(order_id) {
            Some(_) => OrderCell::shop_order(&self.admin_url, order_id),
            None => OrderCell::deleted(order_id),
        };
        self.renderer.render(order_id, default)
    }
}

fn user_label(user_id: UserId) -> String {
    if user_id.is_guest() {
        "Guest".to_string()
    } else {
        user_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use invtrack_audit::AuditRecord;
    use invtrack_core::memory::{CatalogProduct, InMemoryCatalog};
    use invtrack_core::ProductRef;

    use crate::store::InMemoryAuditStore;

    const ADMIN: &str = "https://shop.test/wp-admin/";

    fn test_catalog() -> InMemoryCatalog {
        InMemoryCatalog::with_products([
            CatalogProduct::tracked(ProductId::new(1), "ABC-1", 12),
            CatalogProduct::untracked(ProductId::new(2), "ABC-2"),
        ])
    }

    fn test_directory() -> StaticOrderDirectory {
        StaticOrderDirectory::new([OrderId::new(10)], [OrderId::new(20)])
    }

    #[test]
    fn current_stock_shown_for_first_page_product_search() {
        let rows = current_stock_rows(&test_catalog(), &AuditFilter::by_product(ProductId::new(1)), Pagination::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stock_after, 12);
        assert_eq!(rows[0].reason, CURRENT_STOCK_LABEL);
    }

    #[test]
    fn current_stock_hidden_for_untracked_later_pages_and_order_filters() {
        let catalog = test_catalog();
        assert!(current_stock_rows(&catalog, &AuditFilter::by_sku("ABC-2"), Pagination::default()).is_empty());
        assert!(
            current_stock_rows(&catalog, &AuditFilter::by_product(ProductId::new(1)), Pagination::page(2, 20))
                .is_empty()
        );

        let with_order = AuditFilter {
            product_id: Some(ProductId::new(1)),
            order_id: Some(OrderId::new(10)),
            ..Default::default()
        };
        assert!(current_stock_rows(&catalog, &with_order, Pagination::default()).is_empty());

        let with_date = AuditFilter {
            product_id: Some(ProductId::new(1)),
            on_or_before: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(current_stock_rows(&catalog, &with_date, Pagination::default()).is_empty());
        assert!(current_stock_rows(&catalog, &AuditFilter::default(), Pagination::default()).is_empty());
    }

    #[test]
    fn default_renderer_links_shop_orders_and_marks_deleted() {
        let screen = HistoryScreen::new(test_directory(), ADMIN);
        assert_eq!(
            screen.order_cell(OrderId::new(10)).href.as_deref(),
            Some("https://shop.test/wp-admin/admin.php?page=wc-orders&action=edit&id=10")
        );
        let gone = screen.order_cell(OrderId::new(99));
        assert_eq!(gone.label, "99 (Deleted)");
        assert!(gone.href.is_none());
    }

    #[test]
    fn po_renderer_retargets_purchase_orders_only() {
        let screen =
            HistoryScreen::new(test_directory(), ADMIN).with_renderer(ExternalPoLinks::new(test_directory(), ADMIN));
        assert_eq!(
            screen.order_cell(OrderId::new(20)).href.as_deref(),
            Some("https://shop.test/wp-admin/post.php?action=edit&post=20")
        );
        assert_eq!(
            screen.order_cell(OrderId::new(10)).href.as_deref(),
            Some("https://shop.test/wp-admin/admin.php?page=wc-orders&action=edit&id=10")
        );
    }

    #[test]
    fn page_combines_rows_and_current_stock() {
        let manager = UpdateManager::new(InMemoryAuditStore::new()).with_page_size(20);
        let record = AuditRecord::builder(ProductRef::new(ProductId::new(1), Some("ABC-1".to_string())))
            .levels(Some(10), Some(12))
            .order(OrderId::new(20))
            .build()
            .unwrap();
        manager.record(record).unwrap();

        let screen = HistoryScreen::new(test_directory(), ADMIN);
        let report = screen
            .page(&manager, &test_catalog(), &AuditFilter::by_product(ProductId::new(1)), 1)
            .unwrap();

        assert_eq!(report.total_count, 1);
        assert_eq!(report.total_pages, 1);
        assert_eq!(report.current_stock.len(), 1);
        assert_eq!(report.rows[0].user, "Guest");
        assert_eq!(report.rows[0].order.as_ref().map(|c| c.label.as_str()), Some("20"));
    }

    #[test]
    fn configured_orders_link_every_id_and_retarget_listed_purchase_orders() {
        let orders = ConfiguredOrders::new([OrderId::new(20)]);
        let screen = HistoryScreen::new(orders.clone(), ADMIN).with_renderer(ExternalPoLinks::new(orders, ADMIN));

        assert_eq!(
            screen.order_cell(OrderId::new(99)).href.as_deref(),
            Some("https://shop.test/wp-admin/admin.php?page=wc-orders&action=edit&id=99")
        );
        assert_eq!(
            screen.order_cell(OrderId::new(20)).href.as_deref(),
            Some("https://shop.test/wp-admin/post.php?action=edit&post=20")
        );
    }
}
