//! Row Store: durable credit records
//!
//! Rows are read back in insertion order (`ORDER BY id`), so page boundaries
//! stay put between reads. Uploads running concurrently only append rows
//! after the ones a reader has already paged past.

use crate::db::models::{InsertedBatch, NewRow, Row};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row as _, SqlitePool};
use tracing::debug;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, email, name, credit_score, credit_lines, masked_phone_number, batch_id, ingested_at
    FROM credit_rows
"#;

/// Handle to the credit row collection
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct RowStore {
    pool: SqlitePool,
}

impl RowStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the underlying pool, waiting for in-flight queries
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert every row of one upload as a single transaction
    ///
    /// Either all rows are stored or none are. An empty slice is a no-op.
    pub async fn insert_many(&self, rows: &[NewRow]) -> Result<InsertedBatch> {
        let batch_id = Uuid::new_v4();
        let ingested_at = Utc::now();

        if rows.is_empty() {
            return Ok(InsertedBatch {
                batch_id,
                inserted: 0,
                ingested_at,
            });
        }

        let mut tx = self.pool.begin().await.map_err(Error::BulkInsert)?;
        let mut inserted = 0u64;

        for row in rows {
            let result = sqlx::query(
                r#"
                INSERT INTO credit_rows
                    (email, name, credit_score, credit_lines, masked_phone_number, batch_id, ingested_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&row.email)
            .bind(&row.name)
            .bind(row.credit_score)
            .bind(row.credit_lines)
            .bind(&row.masked_phone_number)
            .bind(batch_id.to_string())
            .bind(ingested_at)
            .execute(&mut *tx)
            .await
            .map_err(Error::BulkInsert)?;

            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(Error::BulkInsert)?;

        debug!("Inserted batch {} ({} rows)", batch_id, inserted);

        Ok(InsertedBatch {
            batch_id,
            inserted,
            ingested_at,
        })
    }

    /// Rows `[skip, skip + limit)` in insertion order
    pub async fn find(&self, skip: i64, limit: i64) -> Result<Vec<Row>> {
        let sql = format!("{} ORDER BY id ASC LIMIT ? OFFSET ?", SELECT_COLUMNS);
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_from_sqlite).collect()
    }

    /// Total number of stored rows
    pub async fn count_all(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credit_rows")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Every stored row in insertion order
    pub async fn find_all(&self) -> Result<Vec<Row>> {
        let sql = format!("{} ORDER BY id ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(row_from_sqlite).collect()
    }
}

fn row_from_sqlite(row: &SqliteRow) -> Result<Row> {
    let batch_id: String = row.try_get("batch_id")?;
    let batch_id = Uuid::parse_str(&batch_id)
        .map_err(|e| Error::Store(sqlx::Error::Decode(Box::new(e))))?;
    let ingested_at: DateTime<Utc> = row.try_get("ingested_at")?;

    Ok(Row {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        credit_score: row.try_get("credit_score")?,
        credit_lines: row.try_get("credit_lines")?,
        masked_phone_number: row.try_get("masked_phone_number")?,
        batch_id,
        ingested_at,
    })
}
