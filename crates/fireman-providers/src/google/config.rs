//! Google OAuth client configuration and the credential loader.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::store::RemoteStore;

/// Google's authorization endpoint.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google's token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Base URL for Google Calendar API v3.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Redirect used when the credentials list none: the code is shown to the
/// user instead of being sent to a server.
pub const OUT_OF_BAND_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";

/// OAuth 2.0 client configuration for Google API access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
    /// Authorization endpoint.
    pub auth_url: String,
    /// Token endpoint.
    pub token_url: String,
    /// Redirect URI registered for the client.
    pub redirect_uri: String,
}

/// Structure of Google's OAuth credentials JSON file.
///
/// Supports multiple formats:
/// 1. Google Cloud Console format with "installed" or "web" section
/// 2. Flat format with client_id and client_secret at root level
#[derive(Debug, Deserialize)]
struct GoogleCredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

/// OAuth credentials within a nested section of the credentials JSON file.
#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    auth_uri: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl OAuthCredentials {
    /// Creates credentials pointing at Google's endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            redirect_uri: OUT_OF_BAND_REDIRECT.to_string(),
        }
    }

    /// Sets the authorization and token endpoints.
    pub fn with_endpoints(
        mut self,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self
    }

    /// Parses OAuth credentials from a Google credentials JSON string.
    ///
    /// Supports multiple formats:
    /// 1. Google Cloud Console format:
    ///    `{"installed": {"client_id": "...", "client_secret": "..."}}`
    /// 2. Flat format: `{"client_id": "...", "client_secret": "..."}`
    ///
    /// Endpoints missing from the JSON default to Google's; the first entry
    /// of `redirect_uris` becomes the redirect URI.
    pub fn from_json(json: &[u8]) -> Result<Self, String> {
        let file: GoogleCredentialsFile = serde_json::from_slice(json)
            .map_err(|e| format!("failed to parse credentials JSON: {}", e))?;

        if let Some(creds) = file.installed.or(file.web) {
            let mut parsed = Self::new(creds.client_id, creds.client_secret);
            if let Some(auth_uri) = creds.auth_uri {
                parsed.auth_url = auth_uri;
            }
            if let Some(token_uri) = creds.token_uri {
                parsed.token_url = token_uri;
            }
            if let Some(redirect) = creds.redirect_uris.into_iter().next() {
                parsed.redirect_uri = redirect;
            }
            return Ok(parsed);
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err("credentials must contain an 'installed'/'web' section \
             or 'client_id'/'client_secret' at root level"
            .to_string())
    }

    /// Validates that the credentials are usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.client_id.is_empty() {
            return Err("client_id is required".to_string());
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required".to_string());
        }
        for (name, value) in [("auth_uri", &self.auth_url), ("token_uri", &self.token_url)] {
            url::Url::parse(value).map_err(|e| format!("invalid {} '{}': {}", name, value, e))?;
        }
        Ok(())
    }
}

/// Configuration for talking to Google Calendar.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client configuration.
    pub credentials: OAuthCredentials,

    /// OAuth scopes to request.
    ///
    /// Defaults to `["https://www.googleapis.com/auth/calendar.readonly"]`.
    pub scopes: Vec<String>,

    /// Calendar to list events from.
    pub calendar_id: String,

    /// Maximum number of upcoming events to fetch.
    pub max_results: usize,

    /// Base URL of the Calendar API.
    pub api_base: String,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default OAuth scope for read-only calendar access.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar.readonly";

    /// Default calendar.
    pub const DEFAULT_CALENDAR_ID: &'static str = "primary";

    /// Default number of upcoming events.
    pub const DEFAULT_MAX_RESULTS: usize = 10;

    /// Creates a new Google configuration with the given credentials.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            calendar_id: Self::DEFAULT_CALENDAR_ID.to_string(),
            max_results: Self::DEFAULT_MAX_RESULTS,
            api_base: CALENDAR_API_BASE.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("fireman-calendar/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the calendar to list.
    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    /// Sets the maximum number of events.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Sets the Calendar API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        if self.calendar_id.is_empty() {
            return Err("calendar_id is required".to_string());
        }

        if self.max_results == 0 {
            return Err("max_results must be at least 1".to_string());
        }

        url::Url::parse(&self.api_base)
            .map_err(|e| format!("invalid api_base '{}': {}", self.api_base, e))?;

        Ok(())
    }
}

/// Downloads the OAuth client configuration from the remote store.
///
/// The object at `key` must hold a Google credentials JSON document. The
/// returned configuration requests `scopes` and otherwise uses defaults.
pub async fn load_client_config(
    store: &RemoteStore,
    key: &str,
    scopes: Vec<String>,
) -> ProviderResult<GoogleConfig> {
    debug!(key, "downloading OAuth client configuration");

    let body = store.get(key).await?.ok_or_else(|| {
        ProviderError::configuration(format!("OAuth client configuration {} not found", key))
    })?;

    let credentials = OAuthCredentials::from_json(&body).map_err(|e| {
        ProviderError::configuration(format!("unable to parse OAuth client configuration: {}", e))
    })?;

    let config = GoogleConfig::new(credentials).with_scopes(scopes);
    config.validate().map_err(ProviderError::configuration)?;

    info!(key, "loaded OAuth client configuration");
    Ok(config)
}
