//! Ingestion Service: CSV upload to Row Store
//!
//! The upload is parsed row by row into header → value mappings, each mapping
//! becomes a [`NewRow`], and the whole upload is stored with one bulk insert.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use subprice_common::config::MissingNumericPolicy;
use subprice_common::{Error, NewRow, Result, RowStore};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of one successful upload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub stored_count: u64,
    pub batch_id: Uuid,
}

/// Row field a CSV header maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Email,
    Name,
    CreditScore,
    CreditLines,
    MaskedPhoneNumber,
}

impl Column {
    fn label(self) -> &'static str {
        match self {
            Column::Email => "email",
            Column::Name => "name",
            Column::CreditScore => "creditScore",
            Column::CreditLines => "creditLines",
            Column::MaskedPhoneNumber => "maskedPhoneNumber",
        }
    }
}

/// Match a header case-insensitively, ignoring spaces, `_` and `-`
///
/// `CreditScore`, `creditScore`, `credit_score` and `Credit Score` are the same column.
fn column_for_header(header: &str) -> Option<Column> {
    let normalized: String = header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    match normalized.as_str() {
        "email" | "emailaddress" => Some(Column::Email),
        "name" | "fullname" => Some(Column::Name),
        "creditscore" => Some(Column::CreditScore),
        "creditlines" => Some(Column::CreditLines),
        "maskedphonenumber" | "maskedphone" | "phone" | "phonenumber" => {
            Some(Column::MaskedPhoneNumber)
        }
        _ => None,
    }
}

/// Parse CSV text (header row + data rows) into rows ready for insertion
pub fn parse_csv<R: Read>(reader: R, policy: MissingNumericPolicy) -> Result<Vec<NewRow>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| Error::Ingestion(format!("Failed to read CSV header: {}", e)))?
        .clone();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::Ingestion("CSV has no header row".to_string()));
    }

    let columns: Vec<Option<Column>> = headers.iter().map(column_for_header).collect();
    let unmapped: Vec<&str> = headers
        .iter()
        .zip(&columns)
        .filter(|(_, c)| c.is_none())
        .map(|(h, _)| h)
        .collect();
    if !unmapped.is_empty() {
        debug!("Ignoring unrecognized CSV columns: {:?}", unmapped);
    }

    let mut rows = Vec::new();
    let mut record = StringRecord::new();

    loop {
        let more = reader
            .read_record(&mut record)
            .map_err(|e| Error::Ingestion(format!("Failed to parse CSV: {}", e)))?;
        if !more {
            break;
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        rows.push(row_from_record(&columns, &record, line, policy)?);
    }

    Ok(rows)
}

fn row_from_record(
    columns: &[Option<Column>],
    record: &StringRecord,
    line: u64,
    policy: MissingNumericPolicy,
) -> Result<NewRow> {
    let mut row = NewRow::default();
    let mut credit_score: Option<&str> = None;
    let mut credit_lines: Option<&str> = None;

    // Short records leave trailing columns absent; the first non-empty duplicate wins.
    // Identity values are stored exactly as uploaded; only numbers are trimmed.
    for (column, value) in columns.iter().zip(record.iter()) {
        let Some(column) = column else { continue };
        if value.is_empty() {
            continue;
        }
        match column {
            Column::Email => {
                row.email.get_or_insert_with(|| value.to_string());
            }
            Column::Name => {
                row.name.get_or_insert_with(|| value.to_string());
            }
            Column::MaskedPhoneNumber => {
                row.masked_phone_number.get_or_insert_with(|| value.to_string());
            }
            Column::CreditScore | Column::CreditLines => {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                let slot = if *column == Column::CreditScore {
                    &mut credit_score
                } else {
                    &mut credit_lines
                };
                slot.get_or_insert(value);
            }
        }
    }

    row.credit_score = parse_numeric(Column::CreditScore, credit_score, line, policy)?;
    row.credit_lines = parse_numeric(Column::CreditLines, credit_lines, line, policy)?;

    Ok(row)
}

fn parse_numeric(
    column: Column,
    value: Option<&str>,
    line: u64,
    policy: MissingNumericPolicy,
) -> Result<Option<f64>> {
    let Some(value) = value else {
        return match policy {
            MissingNumericPolicy::Null => Ok(None),
            MissingNumericPolicy::Reject => Err(Error::Validation(format!(
                "line {}: {} is required",
                line,
                column.label()
            ))),
        };
    };

    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(Some(number)),
        _ => Err(Error::Validation(format!(
            "line {}: {} '{}' is not a number",
            line,
            column.label(),
            value
        ))),
    }
}

/// Parse an uploaded CSV and store all of its rows as one batch
pub async fn ingest_bytes(
    store: &RowStore,
    bytes: Vec<u8>,
    policy: MissingNumericPolicy,
) -> Result<IngestSummary> {
    let rows = tokio::task::spawn_blocking(move || parse_csv(bytes.as_slice(), policy))
        .await
        .map_err(|e| Error::Ingestion(format!("CSV parser task failed: {}", e)))??;

    let batch = store.insert_many(&rows).await?;

    info!("Stored batch {} ({} rows)", batch.batch_id, batch.inserted);

    Ok(IngestSummary {
        stored_count: batch.inserted,
        batch_id: batch.batch_id,
    })
}

/// Ingest a spooled upload, then delete it
///
/// The file is removed whether or not ingestion succeeded. A failed removal is
/// logged and never turns a successful upload into an error.
pub async fn ingest_file(
    store: &RowStore,
    path: &Path,
    policy: MissingNumericPolicy,
) -> Result<IngestSummary> {
    let result = match tokio::fs::read(path).await {
        Ok(bytes) => ingest_bytes(store, bytes, policy).await,
        Err(e) => Err(Error::Io(e)),
    };

    remove_upload(path).await;

    result
}

/// Delete a spooled upload, logging instead of failing
pub async fn remove_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove upload {}: {}", path.display(), e);
        }
    }
}

/// Remove uploads left behind by an earlier run
///
/// Returns the number of files removed.
pub async fn sweep_stale_uploads(uploads_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(uploads_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            remove_upload(&entry.path()).await;
            removed += 1;
        }
    }

    if removed > 0 {
        info!("Removed {} stale upload(s) from {}", removed, uploads_dir.display());
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Email,Name,CreditScore,CreditLines,MaskedPhoneNumber
ann@example.com,Ann Lee,700,3,(***) ***-1111
bob@example.com,Bob Ray,650,5,(***) ***-2222
";

    #[test]
    fn test_header_matching() {
        assert_eq!(column_for_header("CreditScore"), Some(Column::CreditScore));
        assert_eq!(column_for_header("credit_score"), Some(Column::CreditScore));
        assert_eq!(column_for_header("Credit Score"), Some(Column::CreditScore));
        assert_eq!(column_for_header("creditLines"), Some(Column::CreditLines));
        assert_eq!(column_for_header("maskedPhoneNumber"), Some(Column::MaskedPhoneNumber));
        assert_eq!(column_for_header("EMAIL"), Some(Column::Email));
        assert_eq!(column_for_header("favourite_colour"), None);
    }

    #[test]
    fn test_parse_preserves_values() {
        let rows = parse_csv(SAMPLE.as_bytes(), MissingNumericPolicy::Null).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].email.as_deref(), Some("ann@example.com"));
        assert_eq!(rows[0].name.as_deref(), Some("Ann Lee"));
        assert_eq!(rows[0].credit_score, Some(700.0));
        assert_eq!(rows[0].credit_lines, Some(3.0));
        assert_eq!(rows[0].masked_phone_number.as_deref(), Some("(***) ***-1111"));
        assert_eq!(rows[1].credit_score, Some(650.0));
        assert_eq!(rows[1].credit_lines, Some(5.0));
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let rows = parse_csv("CreditScore,CreditLines\n".as_bytes(), MissingNumericPolicy::Null)
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = parse_csv("".as_bytes(), MissingNumericPolicy::Null).unwrap_err();
        assert!(matches!(err, Error::Ingestion(_)));
    }

    #[test]
    fn test_missing_numeric_stored_as_null() {
        let csv = "CreditScore,CreditLines\n,4\n720\n";
        let rows = parse_csv(csv.as_bytes(), MissingNumericPolicy::Null).unwrap();
        assert_eq!(rows[0].credit_score, None);
        assert_eq!(rows[0].credit_lines, Some(4.0));
        assert_eq!(rows[1].credit_score, Some(720.0));
        assert_eq!(rows[1].credit_lines, None);
    }

    #[test]
    fn test_missing_numeric_rejected_under_strict_policy() {
        let csv = "CreditScore,CreditLines\n700,3\n,4\n";
        let err = parse_csv(csv.as_bytes(), MissingNumericPolicy::Reject).unwrap_err();
        match err {
            Error::Validation(msg) => {
                assert!(msg.contains("line 3"), "unexpected message: {}", msg);
                assert!(msg.contains("creditScore"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let csv = "CreditScore,CreditLines\nexcellent,3\n";
        let err = parse_csv(csv.as_bytes(), MissingNumericPolicy::Null).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let csv = "CreditScore,CreditLines\nNaN,3\n";
        assert!(parse_csv(csv.as_bytes(), MissingNumericPolicy::Null).is_err());
    }

    #[test]
    fn test_unknown_columns_ignored() {
        let csv = "Id,CreditScore,Notes,CreditLines\n1,640,vip,2\n";
        let rows = parse_csv(csv.as_bytes(), MissingNumericPolicy::Null).unwrap();
        assert_eq!(rows[0].credit_score, Some(640.0));
        assert_eq!(rows[0].credit_lines, Some(2.0));
    }

    #[test]
    fn test_identity_values_keep_padding() {
        let csv = "Name , Email,MaskedPhoneNumber, CreditScore,CreditLines\n  Ann  , ann@example.com ,(***) ***-1111 ,  700 ,  \n";
        let rows = parse_csv(csv.as_bytes(), MissingNumericPolicy::Null).unwrap();
        assert_eq!(rows[0].name.as_deref(), Some("  Ann  "));
        assert_eq!(rows[0].email.as_deref(), Some(" ann@example.com "));
        assert_eq!(rows[0].masked_phone_number.as_deref(), Some("(***) ***-1111 "));
        assert_eq!(rows[0].credit_score, Some(700.0));
        assert_eq!(rows[0].credit_lines, None);
    }

    #[tokio::test]
    async fn test_ingest_file_removes_upload() {
        let store = RowStore::new(subprice_common::db::init_in_memory().await.unwrap());
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("upload.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let summary = ingest_file(&store, &path, MissingNumericPolicy::Null).await.unwrap();

        assert_eq!(summary.stored_count, 2);
        assert!(!path.exists(), "upload should be deleted after ingestion");
        assert_eq!(store.count_all().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_ingest_stores_nothing_and_removes_upload() {
        let store = RowStore::new(subprice_common::db::init_in_memory().await.unwrap());
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("upload.csv");
        std::fs::write(&path, "CreditScore,CreditLines\n700,3\nbad,4\n").unwrap();

        let err = ingest_file(&store, &path, MissingNumericPolicy::Null).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(!path.exists());
        assert_eq!(store.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_stale_uploads() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.csv"), "x").unwrap();
        std::fs::write(dir.path().join("b.csv"), "y").unwrap();

        let removed = sweep_stale_uploads(dir.path()).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
