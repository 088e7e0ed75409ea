//! # subprice common library
//!
//! Shared code for the subscription pricing service:
//! - Error taxonomy (validation, ingestion, store)
//! - Configuration loading and root folder resolution
//! - Database initialization, the Row model and the Row Store

pub mod config;
pub mod db;
pub mod error;

pub use db::{NewRow, Row, RowStore};
pub use error::{Error, Result};
