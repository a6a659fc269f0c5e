//! OAuth token model and remote token storage.
//!
//! A single token is cached per deployment, as JSON under one fixed key of
//! the remote store.

use chrono::{DateTime, Datelike, Duration, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::store::RemoteStore;

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Returns the instant `secs` seconds from now.
///
/// Token endpoints are not trusted to send a sane `expires_in`; values that
/// do not fit a timestamp are rejected.
fn expiry_from_now(secs: i64) -> ProviderResult<DateTime<Utc>> {
    TimeDelta::try_seconds(secs)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .ok_or_else(|| {
            ProviderError::invalid_response(format!("expires_in out of range: {}", secs))
        })
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

// Some OAuth libraries write the zero timestamp for "never expires".
fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let expiry = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(expiry.filter(|e| e.year() > 1))
}

/// An OAuth token set.
///
/// Serialized with the common OAuth2 token JSON field names so tokens
/// cached by other tools remain loadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The access token for API requests.
    pub access_token: String,

    /// The token type, normally `Bearer`.
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// The refresh token for obtaining new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the access token expires. `None` means it never does.
    #[serde(
        rename = "expiry",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_expiry"
    )]
    pub expires_at: Option<DateTime<Utc>>,

    /// The OAuth scopes that were granted.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenInfo {
    /// Creates a new token info from OAuth response data.
    ///
    /// Fails if `expires_in_secs` does not describe a representable instant.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> ProviderResult<Self> {
        Ok(Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            refresh_token,
            expires_at: expires_in_secs.map(expiry_from_now).transpose()?,
            scopes,
        })
    }

    /// Sets the token type.
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if the access token is expired or about to expire at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(EXPIRY_SKEW_SECS) >= expires_at,
            None => false,
        }
    }

    /// Returns true if the token was granted every required scope.
    ///
    /// A token with no recorded scopes grants nothing.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Returns a copy with a new access token, keeping the refresh token
    /// unless the refresh response rotated it.
    pub fn refreshed(
        &self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> ProviderResult<Self> {
        Ok(Self {
            access_token: access_token.into(),
            token_type: self.token_type.clone(),
            refresh_token: refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: expires_in_secs.map(expiry_from_now).transpose()?,
            scopes: self.scopes.clone(),
        })
    }
}

/// Remote storage for the cached token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    store: RemoteStore,
    key: String,
}

impl TokenStore {
    /// Creates a token store for the given key.
    pub fn new(store: RemoteStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Loads the cached token.
    ///
    /// Returns `Ok(None)` if no token is stored.
    pub async fn load(&self) -> ProviderResult<Option<TokenInfo>> {
        let Some(body) = self.store.get(&self.key).await? else {
            debug!(key = %self.key, "no cached token");
            return Ok(None);
        };

        let token: TokenInfo = serde_json::from_slice(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse cached token: {}", e))
        })?;

        info!(key = %self.key, "loaded cached token");
        Ok(Some(token))
    }

    /// Uploads the token, replacing any previous one.
    pub async fn save(&self, token: &TokenInfo) -> ProviderResult<()> {
        let body = serde_json::to_vec_pretty(token)
            .map_err(|e| ProviderError::internal(format!("failed to serialize token: {}", e)))?;

        self.store.put(&self.key, body).await?;

        info!(key = %self.key, "cached token");
        Ok(())
    }
}
