//! Update manager: the single write/read entry point to the audit log.
//!
//! Constructed once at startup and handed to whatever needs it. Writes have
//! two flavours: [`UpdateManager::record`] surfaces store failures, while
//! [`UpdateManager::record_best_effort`] logs them and lets the triggering
//! stock operation carry on.

use tracing::{debug, error};

use invtrack_audit::AuditRecord;
use invtrack_core::RecordId;

use crate::store::{AuditFilter, AuditPage, AuditStore, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Pagination, PersistenceError};

#[derive(Debug)]
pub struct UpdateManager<S> {
    store: S,
    page_size: u32,
}

impl<S> UpdateManager<S>
where
    S: AuditStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Default page size used when a query passes no pagination.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn record(&self, record: AuditRecord) -> Result<RecordId, PersistenceError> {
        self.store.append(record).map(|stored| stored.id)
    }

    /// Persist `record`; on failure log it with its full context and return `None`.
    pub fn record_best_effort(&self, source: &str, record: AuditRecord) -> Option<RecordId> {
        let product_id = record.product_id();
        let sku = record.product_sku().unwrap_or_default().to_string();
        let stock_before = record.stock_before();
        let stock_after = record.stock_after();
        let stock_change = record.stock_change();
        let reason = record.reason().unwrap_or_default().to_string();

        match self.store.append(record) {
            Ok(stored) => {
                debug!(
                    source,
                    record_id = %stored.id,
                    product_id = %product_id,
                    sku = %sku,
                    stock_change = ?stock_change,
                    "inventory update recorded"
                );
                Some(stored.id)
            }
            Err(e) => {
                error!(
                    source,
                    product_id = %product_id,
                    sku = %sku,
                    stock_before = ?stock_before,
                    stock_after = ?stock_after,
                    stock_change = ?stock_change,
                    reason = %reason,
                    error = %e,
                    "failed to record inventory update"
                );
                None
            }
        }
    }

    pub fn query(&self, filter: &AuditFilter, pagination: Option<Pagination>) -> Result<AuditPage, PersistenceError> {
        let pagination = pagination.unwrap_or(Pagination {
            limit: self.page_size,
            offset: 0,
        });
        self.store.query(filter, pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invtrack_audit::StoredAuditRecord;
    use invtrack_core::{ProductId, ProductRef};

    use crate::store::InMemoryAuditStore;

    struct RejectingStore;

    impl AuditStore for RejectingStore {
        fn append(&self, _record: AuditRecord) -> Result<StoredAuditRecord, PersistenceError> {
            Err(PersistenceError::Unavailable("down".to_string()))
        }

        fn query(&self, _filter: &AuditFilter, _pagination: Pagination) -> Result<AuditPage, PersistenceError> {
            Err(PersistenceError::Unavailable("down".to_string()))
        }
    }

    fn test_record() -> AuditRecord {
        AuditRecord::builder(ProductRef::new(ProductId::new(5), Some("SKU-5".to_string())))
            .levels(Some(3), Some(1))
            .build()
            .unwrap()
    }

    #[test]
    fn record_returns_assigned_id() {
        let manager = UpdateManager::new(InMemoryAuditStore::new());
        let id = manager.record(test_record()).unwrap();
        assert_eq!(id, RecordId::new(1));
    }

    #[test]
    fn best_effort_swallows_store_failures() {
        let manager = UpdateManager::new(RejectingStore);
        assert!(manager.record_best_effort("test", test_record()).is_none());
        assert!(matches!(
            manager.record(test_record()),
            Err(PersistenceError::Unavailable(_))
        ));
    }

    #[test]
    fn query_without_pagination_uses_configured_page_size() {
        let manager = UpdateManager::new(InMemoryAuditStore::new()).with_page_size(2);
        for _ in 0..3 {
            manager.record(test_record()).unwrap();
        }

        let page = manager.query(&AuditFilter::default(), None).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, 3);
        assert!(page.has_more);
    }

    #[test]
    fn page_size_is_clamped() {
        let manager = UpdateManager::new(InMemoryAuditStore::new()).with_page_size(10_000);
        assert_eq!(manager.page_size(), MAX_PAGE_SIZE);
    }
}
