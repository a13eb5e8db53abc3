//! Inventory audit core (pure, deterministic).
//!
//! Change detection ([`differ`]), the canonical [`AuditRecord`], note
//! templates, the per-operation [`SnapshotCache`] and one normalizer adapter
//! per event source. No IO, no storage.

pub mod cache;
pub mod differ;
pub mod normalizer;
pub mod notes;
pub mod record;

pub use cache::{CapturedProduct, OperationScope, SnapshotCache};
pub use differ::{DeltaKind, StockDelta, diff};
pub use normalizer::{EditSurface, NormalizedBatch, ProposedStock, StockLevels};
pub use notes::{ActorLabel, StockDirection};
pub use record::{AuditRecord, AuditRecordBuilder, Reason, StoredAuditRecord};
