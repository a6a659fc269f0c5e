//! Google Calendar access.
//!
//! # Flow
//!
//! 1. [`load_client_config`] downloads the OAuth client configuration from
//!    the remote store
//! 2. [`TokenManager`] loads the cached token from the remote store, or walks
//!    the user through the authorization-code flow and caches the new token
//! 3. [`GoogleCalendarClient`] lists upcoming events with the resulting
//!    [`AuthenticatedClient`], refreshing the access token when it expires
//!
//! # Example
//!
//! ```ignore
//! use fireman_providers::google::{
//!     ConsolePrompt, GoogleCalendarClient, TokenManager, TokenStore, load_client_config,
//! };
//!
//! let config = load_client_config(&store, "google-calender-credentials.json", scopes).await?;
//! let manager = TokenManager::new(config.clone(), TokenStore::new(store, "token.json"))?;
//! let mut client = manager.authenticated_client(&mut ConsolePrompt::stdio()).await?;
//! let events = GoogleCalendarClient::new(&config).list_upcoming_events(&mut client).await?;
//! ```

mod client;
mod config;
mod manager;
mod oauth;
mod tokens;

pub use client::{EventQuery, GoogleCalendarClient};
pub use config::{
    CALENDAR_API_BASE, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, GoogleConfig, OAuthCredentials,
    OUT_OF_BAND_REDIRECT, load_client_config,
};
pub use manager::{AuthenticatedClient, TokenManager};
pub use oauth::{AUTH_STATE, AuthCodePrompt, ConsolePrompt, OAuthClient};
pub use tokens::{TokenInfo, TokenStore};
