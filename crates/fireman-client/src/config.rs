//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/fireman/config.toml` by default. Every setting has a default,
//! so the file is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use fireman_core::OutputFormat;
use fireman_providers::S3Location;
use fireman_providers::google::GoogleConfig;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the fireman-calendar client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote object store holding the credentials and token.
    pub storage: StorageSettings,

    /// Google Calendar settings.
    pub google: GoogleSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// Remote object store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// S3 bucket name.
    pub bucket: String,

    /// AWS region of the bucket.
    pub region: String,

    /// Custom endpoint for S3-compatible services.
    pub endpoint: Option<String>,

    /// Key of the OAuth client configuration JSON.
    pub credentials_key: String,

    /// Key of the cached token JSON.
    pub token_key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            bucket: "fireman-resolver".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            credentials_key: "google-calender-credentials.json".to_string(),
            token_key: "token.json".to_string(),
        }
    }
}

impl StorageSettings {
    /// Returns the S3 location.
    pub fn location(&self) -> S3Location {
        let location = S3Location::new(&self.bucket, &self.region);
        match self.endpoint {
            Some(ref endpoint) => location.with_endpoint(endpoint),
            None => location,
        }
    }
}

/// Google Calendar settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth scopes to request.
    pub scopes: Vec<String>,

    /// Calendar to list.
    pub calendar_id: String,

    /// Number of upcoming events to list.
    pub max_results: usize,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Calendar API base URL override.
    pub api_base: Option<String>,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            scopes: vec![GoogleConfig::DEFAULT_SCOPE.to_string()],
            calendar_id: GoogleConfig::DEFAULT_CALENDAR_ID.to_string(),
            max_results: GoogleConfig::DEFAULT_MAX_RESULTS,
            timeout: GoogleConfig::DEFAULT_TIMEOUT_SECS,
            api_base: None,
        }
    }
}

impl GoogleSettings {
    /// Applies these settings on top of a downloaded client configuration.
    pub fn apply(&self, config: GoogleConfig) -> GoogleConfig {
        let config = config
            .with_scopes(self.scopes.clone())
            .with_calendar_id(&self.calendar_id)
            .with_max_results(self.max_results)
            .with_timeout(Duration::from_secs(self.timeout));

        match self.api_base {
            Some(ref base) => config.with_api_base(base),
            None => config,
        }
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Output format.
    pub format: OutputFormat,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fireman")
            .join("config.toml")
    }

    /// Checks the settings that do not need the remote configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage.bucket.is_empty() {
            return Err("storage.bucket is required".to_string());
        }
        if self.storage.region.is_empty() {
            return Err("storage.region is required".to_string());
        }
        if self.storage.credentials_key.is_empty() || self.storage.token_key.is_empty() {
            return Err("storage.credentials_key and storage.token_key are required".to_string());
        }
        if self.storage.credentials_key == self.storage.token_key {
            return Err("storage.credentials_key and storage.token_key must differ".to_string());
        }
        if self.google.scopes.is_empty() {
            return Err("google.scopes must not be empty".to_string());
        }
        if self.google.max_results == 0 {
            return Err("google.max_results must be at least 1".to_string());
        }
        if self.google.timeout == 0 {
            return Err("google.timeout must be at least 1".to_string());
        }
        Ok(())
    }
}
