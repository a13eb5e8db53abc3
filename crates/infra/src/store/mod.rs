//! Append-only audit log boundary.
//!
//! The [`AuditStore`] trait plus two implementations: an in-memory log for
//! tests and development, and a Postgres table for production.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryAuditStore;
pub use postgres::PostgresAuditStore;
pub use r#trait::{
    AuditFilter, AuditPage, AuditStore, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Pagination, PersistenceError,
};
