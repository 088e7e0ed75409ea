//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "SUBPRICE_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "subprice.db";

/// Temporary upload directory inside the root folder
pub const UPLOADS_DIR: &str = "uploads";

/// Largest page size a config may allow
pub const PAGE_SIZE_CEILING: i64 = 100_000;

/// What ingestion does with an empty or absent `creditScore` / `creditLines`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingNumericPolicy {
    /// Store the field as NULL; pricing yields a null price for that row
    #[default]
    Null,
    /// Fail the whole upload with a validation error
    Reject,
}

/// Settings read from `config.toml`
///
/// Every key is optional. Missing keys fall back to compiled defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: String,
    pub port: u16,
    /// Allowed browser origin; `"*"` allows any origin
    pub cors_origin: String,
    pub max_upload_bytes: usize,
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub missing_numeric: MissingNumericPolicy,
    pub log_level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            cors_origin: "http://localhost:3000".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
            default_page_size: 10,
            max_page_size: 1000,
            missing_numeric: MissingNumericPolicy::Null,
            log_level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`
    ///
    /// A missing file is not an error: defaults are used and a warning is logged.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from the platform config directory, if any
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load(&path),
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.default_page_size < 1 {
            return Err(Error::Config(format!(
                "default_page_size must be at least 1 (got {})",
                self.default_page_size
            )));
        }
        if self.max_page_size < self.default_page_size {
            return Err(Error::Config(format!(
                "max_page_size ({}) must not be smaller than default_page_size ({})",
                self.max_page_size, self.default_page_size
            )));
        }
        if self.max_page_size > PAGE_SIZE_CEILING {
            return Err(Error::Config(format!(
                "max_page_size must not exceed {} (got {})",
                PAGE_SIZE_CEILING, self.max_page_size
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be positive".to_string()));
        }
        Ok(())
    }
}

/// Platform config file location: `<config_dir>/subprice/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("subprice").join("config.toml"))
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `SUBPRICE_ROOT_FOLDER` environment variable
/// 3. `root_folder` from the TOML config
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    get_default_root_folder()
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("subprice"))
        .unwrap_or_else(|| PathBuf::from("./subprice_data"))
}

/// Creates the root folder layout and hands out the paths inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder and its `uploads/` directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            info!("Creating root folder: {}", self.root_folder.display());
        }
        std::fs::create_dir_all(self.uploads_path())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.root_folder.join(UPLOADS_DIR)
    }
}
