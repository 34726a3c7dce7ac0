//! Station configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first if present.

use crate::services::assets::DEFAULT_STORAGE_BASE_URL;
use crate::services::roster::DEFAULT_TBA_BASE_URL;
use std::env;
use std::path::PathBuf;

/// Station configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Local ---
    /// Directory holding the persisted store slots
    pub data_dir: PathBuf,

    // --- Remote store ---
    /// GCP project ID for Firestore
    pub gcp_project_id: String,

    // --- Photo storage ---
    /// Cloud Storage bucket for team photos
    pub asset_bucket: String,
    /// Storage API base URL (overridable for emulators)
    pub asset_base_url: String,
    /// OAuth bearer token for uploads; anonymous if unset
    pub asset_access_token: Option<String>,

    // --- Roster ---
    pub tba_api_key: Option<String>,
    pub tba_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only `GCP_PROJECT_ID` and `ASSET_BUCKET` are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            asset_bucket: env::var("ASSET_BUCKET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("ASSET_BUCKET"))?,
            asset_base_url: env::var("ASSET_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_STORAGE_BASE_URL.to_string()),
            asset_access_token: optional_var("ASSET_ACCESS_TOKEN"),
            tba_api_key: optional_var("TBA_API_KEY"),
            tba_base_url: env::var("TBA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_TBA_BASE_URL.to_string()),
        })
    }
}

/// Trimmed value of an env var, `None` if unset or blank.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
