//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod events;

use fireman_providers::RemoteStore;
use fireman_providers::google::{GoogleConfig, TokenManager, TokenStore, load_client_config};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Opens the S3 bucket named by the configuration.
pub fn open_store(config: &ClientConfig) -> ClientResult<RemoteStore> {
    config.validate().map_err(ClientError::Config)?;
    Ok(RemoteStore::s3(&config.storage.location())?)
}

/// Downloads the OAuth client configuration and applies local settings.
pub async fn google_config(
    store: &RemoteStore,
    config: &ClientConfig,
) -> ClientResult<GoogleConfig> {
    let google = load_client_config(
        store,
        &config.storage.credentials_key,
        config.google.scopes.clone(),
    )
    .await?;

    Ok(config.google.apply(google))
}

/// Builds a token manager backed by the store.
pub async fn token_manager(
    store: &RemoteStore,
    config: &ClientConfig,
) -> ClientResult<TokenManager> {
    let google = google_config(store, config).await?;
    let tokens = TokenStore::new(store.clone(), &config.storage.token_key);
    Ok(TokenManager::new(google, tokens)?)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use fireman_providers::google::AuthCodePrompt;
    use fireman_providers::{ProviderError, ProviderResult, RemoteStore};
    use object_store::aws::AmazonS3Builder;
    use wiremock::MockServer;

    use crate::config::ClientConfig;

    pub const SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

    /// Prompt that answers with a fixed code and counts calls.
    pub struct FixedPrompt {
        pub code: Option<String>,
        pub calls: usize,
    }

    impl FixedPrompt {
        pub fn answering(code: &str) -> Self {
            Self {
                code: Some(code.to_string()),
                calls: 0,
            }
        }

        pub fn unused() -> Self {
            Self {
                code: None,
                calls: 0,
            }
        }
    }

    impl AuthCodePrompt for FixedPrompt {
        fn read_code(&mut self, _auth_url: &str) -> ProviderResult<String> {
            self.calls += 1;
            self.code
                .clone()
                .ok_or_else(|| ProviderError::authentication("no code available"))
        }
    }

    /// Client configuration pointing the Calendar API at the mock server.
    pub fn client_config(server: &MockServer) -> ClientConfig {
        let mut config = ClientConfig::default();
        config.google.api_base = Some(server.uri());
        config
    }

    /// S3 store whose bucket is served by the mock server.
    pub fn s3_store(server: &MockServer, config: &ClientConfig) -> RemoteStore {
        let store = AmazonS3Builder::new()
            .with_bucket_name(&config.storage.bucket)
            .with_region(&config.storage.region)
            .with_endpoint(server.uri())
            .with_allow_http(true)
            .with_access_key_id("test")
            .with_secret_access_key("test")
            .build()
            .unwrap();
        RemoteStore::new(Arc::new(store))
    }

    /// Uploads a credentials document whose token endpoint is the mock server.
    pub async fn seed_credentials(store: &RemoteStore, config: &ClientConfig, server: &MockServer) {
        let credentials = serde_json::json!({
            "installed": {
                "client_id": "client-id",
                "client_secret": "client-secret",
                "auth_uri": format!("{}/auth", server.uri()),
                "token_uri": format!("{}/token", server.uri()),
                "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob"]
            }
        });
        store
            .put(
                &config.storage.credentials_key,
                serde_json::to_vec(&credentials).unwrap(),
            )
            .await
            .unwrap();
    }
}
