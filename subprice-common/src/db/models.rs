//! Database models

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One persisted credit record
///
/// Immutable once stored; the store exposes no update or delete path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// Store-assigned id, increasing in insertion order
    pub id: i64,
    pub email: Option<String>,
    pub name: Option<String>,
    pub credit_score: Option<f64>,
    pub credit_lines: Option<f64>,
    pub masked_phone_number: Option<String>,
    /// Upload that created this row
    pub batch_id: Uuid,
    pub ingested_at: DateTime<Utc>,
}

/// A credit record parsed from an upload, not yet stored
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRow {
    pub email: Option<String>,
    pub name: Option<String>,
    pub credit_score: Option<f64>,
    pub credit_lines: Option<f64>,
    pub masked_phone_number: Option<String>,
}

/// Outcome of one bulk insert
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedBatch {
    pub batch_id: Uuid,
    pub inserted: u64,
    pub ingested_at: DateTime<Utc>,
}
