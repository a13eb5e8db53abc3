//! Postgres-backed audit store.
//!
//! One row per record in `inventory_updates`. Rows are append-only; the
//! surrogate id is a `BIGSERIAL` and doubles as the tie-break for records
//! sharing a timestamp.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | PersistenceError |
//! |------------|----------------------|------------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (foreign key violation) | `23503` | `Constraint` |
//! | Database (check constraint violation) | `23514` | `Constraint` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` |
//! | Other | N/A | `Storage` |

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::instrument;

use invtrack_audit::{AuditRecord, StoredAuditRecord};
use invtrack_core::{OrderId, ProductId, ProductRef, RecordId, UserId};

use super::r#trait::{AuditFilter, AuditPage, AuditStore, Pagination, PersistenceError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS inventory_updates (
    id BIGSERIAL PRIMARY KEY,
    timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    product_sku VARCHAR(100),
    product_id BIGINT NOT NULL,
    order_id BIGINT,
    user_id BIGINT NOT NULL,
    stock_before INT,
    stock_after INT,
    stock_change INT,
    reason VARCHAR(255),
    notes TEXT,
    CONSTRAINT inventory_updates_has_level
        CHECK (stock_before IS NOT NULL OR stock_after IS NOT NULL)
)
"#;

const CREATE_INDEXES: [&str; 4] = [
    "CREATE INDEX IF NOT EXISTS inventory_updates_product_id_idx ON inventory_updates (product_id)",
    "CREATE INDEX IF NOT EXISTS inventory_updates_product_sku_idx ON inventory_updates (product_sku)",
    "CREATE INDEX IF NOT EXISTS inventory_updates_order_id_idx ON inventory_updates (order_id)",
    "CREATE INDEX IF NOT EXISTS inventory_updates_timestamp_idx ON inventory_updates (timestamp DESC, id DESC)",
];

// Shared WHERE clause; $1..$4 are the optional filter fields.
const FILTER_CLAUSE: &str = r#"
    ($1::bigint IS NULL OR product_id = $1)
    AND ($2::text IS NULL OR product_sku ILIKE '%' || $2 || '%' ESCAPE '\')
    AND ($3::bigint IS NULL OR order_id = $3)
    AND ($4::date IS NULL OR (timestamp AT TIME ZONE 'UTC')::date <= $4)
"#;

/// Postgres-backed append-only audit store.
///
/// The [`AuditStore`] trait is synchronous; calls are driven on the runtime
/// behind `handle`, so they must not be made from one of its worker threads.
#[derive(Debug, Clone)]
pub struct PostgresAuditStore {
    pool: Arc<PgPool>,
    handle: Handle,
}

impl PostgresAuditStore {
    pub fn new(pool: PgPool, handle: Handle) -> Self {
        Self {
            pool: Arc::new(pool),
            handle,
        }
    }

    /// Create the table and its indexes if missing.
    #[instrument(skip(self), err)]
    pub async fn create_schema(&self) -> Result<(), PersistenceError> {
        sqlx::query(CREATE_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_table", e))?;

        for statement in CREATE_INDEXES {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("create_index", e))?;
        }
        Ok(())
    }

    /// Blocking wrapper around [`create_schema`](Self::create_schema).
    pub fn ensure_schema(&self) -> Result<(), PersistenceError> {
        self.handle.block_on(self.create_schema())
    }

    #[instrument(
        skip(self, record),
        fields(
            product_id = record.product_id().get(),
            reason = record.reason().unwrap_or_default()
        ),
        err
    )]
    pub async fn insert(&self, record: AuditRecord) -> Result<StoredAuditRecord, PersistenceError> {
        let row = sqlx::query(
            r#"
            INSERT INTO inventory_updates (
                timestamp,
                product_sku,
                product_id,
                order_id,
                user_id,
                stock_before,
                stock_after,
                stock_change,
                reason,
                notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(record.timestamp())
        .bind(record.product_sku())
        .bind(record.product_id().get())
        .bind(record.order_id().map(OrderId::get))
        .bind(record.user_id().get())
        .bind(to_column("stock_before", record.stock_before())?)
        .bind(to_column("stock_after", record.stock_after())?)
        .bind(to_column("stock_change", record.stock_change())?)
        .bind(record.reason())
        .bind(record.notes())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| PersistenceError::Storage(format!("failed to read inserted id: {e}")))?;

        Ok(StoredAuditRecord::new(RecordId::new(id), record))
    }

    #[instrument(skip(self), err)]
    pub async fn fetch_page(
        &self,
        filter: &AuditFilter,
        pagination: Pagination,
    ) -> Result<AuditPage, PersistenceError> {
        let product_id = filter.product_id.map(ProductId::get);
        let sku = filter.product_sku.as_deref().map(escape_like);
        let order_id = filter.order_id.map(OrderId::get);

        let count_row = sqlx::query(&format!(
            "SELECT COUNT(*) AS total FROM inventory_updates WHERE {FILTER_CLAUSE}"
        ))
        .bind(product_id)
        .bind(sku.as_deref())
        .bind(order_id)
        .bind(filter.on_or_before)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count", e))?;

        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| PersistenceError::Storage(format!("failed to read count: {e}")))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT
                id,
                timestamp,
                product_sku,
                product_id,
                order_id,
                user_id,
                stock_before,
                stock_after,
                stock_change,
                reason,
                notes
            FROM inventory_updates
            WHERE {FILTER_CLAUSE}
            ORDER BY timestamp DESC, id DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(product_id)
        .bind(sku.as_deref())
        .bind(order_id)
        .bind(filter.on_or_before)
        .bind(i64::from(pagination.limit))
        .bind(i64::from(pagination.offset))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("query", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let row = AuditRow::from_row(&row)
                .map_err(|e| PersistenceError::Storage(format!("failed to decode audit row: {e}")))?;
            items.push(row.into_stored()?);
        }

        Ok(AuditPage::new(items, total.max(0) as u64, pagination))
    }
}

impl AuditStore for PostgresAuditStore {
    fn append(&self, record: AuditRecord) -> Result<StoredAuditRecord, PersistenceError> {
        self.handle.block_on(self.insert(record))
    }

    fn query(&self, filter: &AuditFilter, pagination: Pagination) -> Result<AuditPage, PersistenceError> {
        self.handle.block_on(self.fetch_page(filter, pagination))
    }
}

/// Map SQLx errors to PersistenceError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> PersistenceError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") | Some("23514") => PersistenceError::Constraint(msg),
                _ => PersistenceError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            PersistenceError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            PersistenceError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::Io(e) => PersistenceError::Unavailable(format!("io error in {operation}: {e}")),
        _ => PersistenceError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}

/// Stock columns are `INT`.
fn to_column(column: &str, value: Option<i64>) -> Result<Option<i32>, PersistenceError> {
    value
        .map(i32::try_from)
        .transpose()
        .map_err(|_| PersistenceError::Constraint(format!("{column} out of range for INT column")))
}

/// Escape LIKE wildcards so the SKU filter is a literal substring match.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// SQLx row types

#[derive(Debug)]
struct AuditRow {
    id: i64,
    timestamp: DateTime<Utc>,
    product_sku: Option<String>,
    product_id: i64,
    order_id: Option<i64>,
    user_id: i64,
    stock_before: Option<i32>,
    stock_after: Option<i32>,
    #[allow(dead_code)] // recomputed from the levels on decode
    stock_change: Option<i32>,
    reason: Option<String>,
    notes: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for AuditRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(AuditRow {
            id: row.try_get("id")?,
            timestamp: row.try_get("timestamp")?,
            product_sku: row.try_get("product_sku")?,
            product_id: row.try_get("product_id")?,
            order_id: row.try_get("order_id")?,
            user_id: row.try_get("user_id")?,
            stock_before: row.try_get("stock_before")?,
            stock_after: row.try_get("stock_after")?,
            stock_change: row.try_get("stock_change")?,
            reason: row.try_get("reason")?,
            notes: row.try_get("notes")?,
        })
    }
}

impl AuditRow {
    fn into_stored(self) -> Result<StoredAuditRecord, PersistenceError> {
        let mut builder = AuditRecord::builder(ProductRef::new(ProductId::new(self.product_id), self.product_sku))
            .levels(self.stock_before.map(i64::from), self.stock_after.map(i64::from))
            .user(UserId::new(self.user_id))
            .timestamp(self.timestamp);
        if let Some(order_id) = self.order_id {
            builder = builder.order(OrderId::new(order_id));
        }
        if let Some(reason) = self.reason {
            builder = builder.reason_label(reason);
        }
        if let Some(notes) = self.notes {
            builder = builder.notes(notes);
        }

        let record = builder
            .build()
            .map_err(|e| PersistenceError::Storage(format!("row {} is not a valid record: {e}", self.id)))?;
        Ok(StoredAuditRecord::new(RecordId::new(self.id), record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("AB_C%"), "AB\\_C\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain-123"), "plain-123");
    }

    #[test]
    fn stock_levels_outside_int_range_are_rejected() {
        assert_eq!(to_column("stock_before", Some(12)).unwrap(), Some(12));
        assert_eq!(to_column("stock_before", None).unwrap(), None);
        assert!(matches!(
            to_column("stock_after", Some(i64::from(i32::MAX) + 1)),
            Err(PersistenceError::Constraint(_))
        ));
    }

    #[test]
    fn decoded_row_recomputes_change() {
        let row = AuditRow {
            id: 7,
            timestamp: Utc::now(),
            product_sku: Some("ABC".to_string()),
            product_id: 42,
            order_id: Some(1001),
            user_id: 3,
            stock_before: Some(10),
            stock_after: Some(15),
            stock_change: Some(5),
            reason: Some("External PO Update".to_string()),
            notes: None,
        };
        let stored = row.into_stored().unwrap();
        assert_eq!(stored.id, RecordId::new(7));
        assert_eq!(stored.record.stock_change(), Some(5));
        assert_eq!(stored.record.order_id(), Some(OrderId::new(1001)));
    }

    #[test]
    fn row_without_levels_is_a_storage_error() {
        let row = AuditRow {
            id: 8,
            timestamp: Utc::now(),
            product_sku: None,
            product_id: 1,
            order_id: None,
            user_id: 0,
            stock_before: None,
            stock_after: None,
            stock_change: None,
            reason: None,
            notes: None,
        };
        assert!(matches!(row.into_stored(), Err(PersistenceError::Storage(_))));
    }
}
