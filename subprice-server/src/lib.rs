//! subprice-server library
//!
//! Credit record upload, paginated browsing and subscription price calculation
//! over HTTP. Exposed as a library so integration tests can drive the router.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use subprice_common::config::{MissingNumericPolicy, TomlConfig};
use subprice_common::{Error, RowStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod ingest;
pub mod pagination;
pub mod pricing;

pub use crate::error::{ApiError, ApiResult};

/// Which browser origins may call the API
#[derive(Debug, Clone)]
pub enum CorsPolicy {
    Any,
    Origin(HeaderValue),
}

impl CorsPolicy {
    fn parse(origin: &str) -> subprice_common::Result<Self> {
        if origin.trim() == "*" {
            return Ok(CorsPolicy::Any);
        }
        HeaderValue::from_str(origin.trim())
            .map(CorsPolicy::Origin)
            .map_err(|_| Error::Config(format!("Invalid cors_origin: {}", origin)))
    }

    fn layer(&self) -> CorsLayer {
        match self {
            CorsPolicy::Any => CorsLayer::permissive(),
            CorsPolicy::Origin(origin) => CorsLayer::new()
                .allow_origin(origin.clone())
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        }
    }
}

/// Request-independent settings the handlers read
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Where uploads are spooled before ingestion
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub missing_numeric: MissingNumericPolicy,
    pub cors: CorsPolicy,
}

impl ServiceSettings {
    pub fn from_config(config: &TomlConfig, uploads_dir: PathBuf) -> subprice_common::Result<Self> {
        Ok(Self {
            uploads_dir,
            max_upload_bytes: config.max_upload_bytes,
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
            missing_numeric: config.missing_numeric,
            cors: CorsPolicy::parse(&config.cors_origin)?,
        })
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Row Store handle, created at startup and closed on shutdown
    pub store: RowStore,
    pub settings: Arc<ServiceSettings>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: RowStore, settings: ServiceSettings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let upload_limit = DefaultBodyLimit::max(state.settings.max_upload_bytes);
    let cors = state.settings.cors.layer();

    let api = Router::new()
        .route("/upload", post(api::upload_csv).layer(upload_limit))
        .route("/data", get(api::get_data_page))
        .route("/calculate", post(api::calculate_prices));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(public)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
