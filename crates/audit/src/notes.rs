//! Note templates for audit records.
//!
//! Every human-readable `notes` string is composed here so adapters stay
//! declarative.

use core::fmt;

/// Who triggered an order-driven stock movement, as shown in notes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActorLabel {
    Admin,
    Customer,
}

impl ActorLabel {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::Customer }
    }
}

impl fmt::Display for ActorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorLabel::Admin => f.write_str("Admin"),
            ActorLabel::Customer => f.write_str("Customer"),
        }
    }
}

/// Direction of a stock movement reported by an order or purchase order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockDirection {
    Increase,
    Decrease,
}

impl StockDirection {
    fn progressive(self) -> &'static str {
        match self {
            StockDirection::Increase => "increasing",
            StockDirection::Decrease => "reducing",
        }
    }

    fn past(self) -> &'static str {
        match self {
            StockDirection::Increase => "increased",
            StockDirection::Decrease => "decreased",
        }
    }
}

pub fn tracking_disabled(sku: &str) -> String {
    format!("stock tracking disabled for {sku}")
}

pub fn tracking_enabled(sku: &str) -> String {
    format!("stock tracking enabled for {sku}")
}

pub fn quantity_updated(sku: &str, after: i64) -> String {
    format!("stock for {sku} updated to {after}")
}

/// `Customer updated order to "processing" status reducing stock for ABC by 2`
pub fn order_status_change(
    actor: ActorLabel,
    status: &str,
    direction: StockDirection,
    sku: &str,
    line_quantity: i64,
) -> String {
    format!(
        "{actor} updated order to \"{status}\" status {} stock for {sku} by {line_quantity}",
        direction.progressive()
    )
}

pub fn line_item_deleted(sku: &str, line_quantity: i64) -> String {
    format!("Admin deleted line item for {sku} with quantity {line_quantity}")
}

pub fn line_item_updated(sku: &str, previous_quantity: i64, line_quantity: i64) -> String {
    format!("Admin updated line item for {sku} from {previous_quantity} to {line_quantity}")
}

pub fn refund_restock(restored: i64, sku: &str) -> String {
    format!("Order was refunded restoring {restored} stock to product {sku}")
}

/// `PO set to status "received" which increased ABC stock by 5`
pub fn purchase_order(status: &str, direction: StockDirection, sku: &str, line_quantity: i64) -> String {
    format!(
        "PO set to status \"{status}\" which {} {sku} stock by {line_quantity}",
        direction.past()
    )
}

pub fn stock_central(sku: &str, proposed: &str) -> String {
    format!("Stock for {sku} was set to {proposed} in Stock Central")
}
