use std::sync::RwLock;

use invtrack_audit::{AuditRecord, StoredAuditRecord};
use invtrack_core::RecordId;

use super::r#trait::{AuditFilter, AuditPage, AuditStore, Pagination, PersistenceError};

#[derive(Debug, Default)]
struct Log {
    records: Vec<StoredAuditRecord>,
    last_id: i64,
}

/// In-memory append-only audit store.
///
/// Intended for tests/dev. Queries scan the whole log.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    log: RwLock<Log>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditStore for InMemoryAuditStore {
    fn append(&self, record: AuditRecord) -> Result<StoredAuditRecord, PersistenceError> {
        let mut log = self
            .log
            .write()
            .map_err(|_| PersistenceError::Unavailable("lock poisoned".to_string()))?;

        log.last_id += 1;
        let stored = StoredAuditRecord::new(RecordId::new(log.last_id), record);
        log.records.push(stored.clone());
        Ok(stored)
    }

    fn query(&self, filter: &AuditFilter, pagination: Pagination) -> Result<AuditPage, PersistenceError> {
        let log = self
            .log
            .read()
            .map_err(|_| PersistenceError::Unavailable("lock poisoned".to_string()))?;

        let mut matching: Vec<&StoredAuditRecord> = log
            .records
            .iter()
            .filter(|r| filter.matches(&r.record))
            .collect();

        // Newest first; later inserts win timestamp ties.
        matching.sort_by(|a, b| {
            b.record
                .timestamp()
                .cmp(&a.record.timestamp())
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect();

        Ok(AuditPage::new(items, total, pagination))
    }
}
