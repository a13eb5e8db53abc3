//! `invtrack-core`: audit domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error model, stock snapshots and the capability traits the
//! audit core uses to read host catalog/order/session state.

pub mod error;
pub mod host;
pub mod id;
pub mod memory;
pub mod snapshot;

pub use error::{AuditError, AuditResult};
pub use host::{ActorContext, Catalog, OrderContext, OrderLine, ProductSnapshotSource};
pub use id::{OrderId, ProductId, RecordId, UserId};
pub use snapshot::{ProductRef, StockSnapshot};
