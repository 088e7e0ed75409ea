//! CSV upload
//!
//! POST /upload (multipart, field `file`)
//!
//! The file is spooled to the uploads directory, ingested as one batch and
//! then deleted. The stored row count is returned in the response itself.

use std::path::Path;

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, State,
    },
    Json,
};
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use crate::ingest::{ingest_file, remove_upload, IngestSummary};
use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the CSV
const FILE_FIELD: &str = "file";

/// POST /upload
pub async fn upload_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<IngestSummary>> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let spool_path = state
            .settings
            .uploads_dir
            .join(format!("{}.csv", Uuid::new_v4()));

        let bytes = match spool_field(field, &spool_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                remove_upload(&spool_path).await;
                return Err(e);
            }
        };

        info!("Received upload '{}' ({} bytes)", file_name, bytes);

        let summary = ingest_file(&state.store, &spool_path, state.settings.missing_numeric).await?;
        return Ok(Json(summary));
    }

    Err(ApiError::BadRequest(format!(
        "multipart field '{}' is required",
        FILE_FIELD
    )))
}

/// Stream one multipart field to disk, returning the byte count
async fn spool_field(mut field: Field<'_>, path: &Path) -> ApiResult<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;

    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}
