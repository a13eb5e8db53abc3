//! Infrastructure layer: audit storage, the update manager, host hook
//! dispatch, history screen read side and configuration.

pub mod config;
pub mod manager;
pub mod report;
pub mod store;
pub mod tracker;


pub use config::{ConfigError, TrackerConfig};
pub use manager::UpdateManager;
pub use report::{ConfiguredOrders, ExternalPoLinks, HistoryReport, HistoryScreen};
pub use store::{AuditFilter, AuditPage, AuditStore, InMemoryAuditStore, Pagination, PersistenceError, PostgresAuditStore};
pub use tracker::{CaptureSession, EditSession, InventoryTracker};
