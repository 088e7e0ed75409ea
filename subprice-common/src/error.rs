//! Common error types for subprice

use thiserror::Error;

/// Common result type for subprice operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the ingestion, pagination and pricing services
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed CSV value or a required field missing
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uploaded CSV could not be parsed
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Bulk insert of an ingested batch failed; nothing from the batch was stored
    #[error("Ingestion error: bulk insert failed: {0}")]
    BulkInsert(#[source] sqlx::Error),

    /// Store unreachable or query failure (wraps sqlx::Error)
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
