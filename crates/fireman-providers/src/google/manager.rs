//! Token lifecycle: cached token, interactive fallback, refresh.
//!
//! [`TokenManager`] turns a client configuration into an
//! [`AuthenticatedClient`]. The cached token is used when it is present,
//! parses, and carries the requested scopes; otherwise the user is walked
//! through the authorization-code flow once and the new token is persisted
//! before the client is returned.

use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::GoogleConfig;
use super::oauth::{AuthCodePrompt, OAuthClient};
use super::tokens::{TokenInfo, TokenStore};

/// Produces authenticated clients from a client configuration.
#[derive(Debug, Clone)]
pub struct TokenManager {
    config: GoogleConfig,
    tokens: TokenStore,
    oauth: OAuthClient,
}

impl TokenManager {
    /// Creates a token manager. Does not touch the network.
    pub fn new(config: GoogleConfig, tokens: TokenStore) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;
        let oauth = OAuthClient::new(&config)?;

        Ok(Self {
            config,
            tokens,
            oauth,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Loads the cached token if it is usable for the configured scopes.
    ///
    /// Download failures, parse failures and scope mismatches all yield
    /// `None`: the caller falls back to the interactive flow.
    pub async fn cached_token(&self) -> Option<TokenInfo> {
        let token = match self.tokens.load().await {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                warn!("ignoring cached token: {}", e);
                return None;
            }
        };

        if !token.has_scopes(&self.config.scopes) {
            warn!(
                granted = ?token.scopes,
                requested = ?self.config.scopes,
                "cached token does not cover the requested scopes, re-authorization required"
            );
            return None;
        }

        Some(token)
    }

    /// Returns a client for the cached token, or runs the interactive flow.
    pub async fn authenticated_client(
        &self,
        prompt: &mut dyn AuthCodePrompt,
    ) -> ProviderResult<AuthenticatedClient> {
        let token = match self.cached_token().await {
            Some(token) => {
                debug!("using cached token");
                token
            }
            None => self.authorize(prompt).await?,
        };

        self.client_for(token)
    }

    /// Runs the interactive flow and persists the resulting token.
    pub async fn authorize(&self, prompt: &mut dyn AuthCodePrompt) -> ProviderResult<TokenInfo> {
        info!("starting interactive authorization");

        let token = self.oauth.authorize(&self.config.scopes, prompt).await?;
        self.tokens.save(&token).await?;

        Ok(token)
    }

    /// Wraps a token in an authenticated client.
    pub fn client_for(&self, token: TokenInfo) -> ProviderResult<AuthenticatedClient> {
        let http_client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(AuthenticatedClient {
            http_client,
            token,
            oauth: self.oauth.clone(),
            tokens: self.tokens.clone(),
        })
    }
}

/// HTTP client that attaches the bearer token to every request.
///
/// An expired access token is refreshed, and the refreshed token persisted,
/// before the request is built.
#[derive(Debug)]
pub struct AuthenticatedClient {
    http_client: reqwest::Client,
    token: TokenInfo,
    oauth: OAuthClient,
    tokens: TokenStore,
}

impl AuthenticatedClient {
    /// Returns the current token.
    pub fn token(&self) -> &TokenInfo {
        &self.token
    }

    /// Refreshes the access token if it has expired.
    pub async fn ensure_fresh(&mut self) -> ProviderResult<()> {
        if !self.token.is_expired() {
            return Ok(());
        }

        if self.token.refresh_token.is_none() {
            return Err(ProviderError::authentication(
                "access token expired and no refresh token - run 'fireman-calendar auth --force'",
            ));
        }

        debug!("refreshing expired access token");
        let fresh = self.oauth.refresh(&self.token).await?;
        self.tokens.save(&fresh).await?;
        self.token = fresh;

        Ok(())
    }

    /// Builds an authenticated GET request.
    pub async fn get(&mut self, url: &str) -> ProviderResult<reqwest::RequestBuilder> {
        self.ensure_fresh().await?;
        Ok(self
            .http_client
            .get(url)
            .bearer_auth(&self.token.access_token))
    }
}
