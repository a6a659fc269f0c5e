//! Authorization command.

use fireman_providers::RemoteStore;
use fireman_providers::google::{AuthCodePrompt, ConsolePrompt, TokenInfo};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::ClientResult;

use super::{open_store, token_manager};

/// Result of an authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A usable token was already cached; nothing was done.
    AlreadyAuthorized,
    /// The interactive flow ran and a new token was cached.
    Authorized,
}

/// Runs the interactive authorization flow.
pub async fn run(config: &ClientConfig, force: bool) -> ClientResult<()> {
    let store = open_store(config)?;
    let mut prompt = ConsolePrompt::stdio();

    match authorize(&store, config, &mut prompt, force).await? {
        AuthOutcome::AlreadyAuthorized => {
            println!("Already authorized with Google Calendar.");
            println!("Use --force to re-authorize.");
        }
        AuthOutcome::Authorized => {
            println!();
            println!("Authorization successful!");
            println!(
                "Token cached at s3://{}/{}",
                config.storage.bucket, config.storage.token_key
            );
        }
    }

    Ok(())
}

/// Authorizes unless a usable token is cached and `force` is not set.
pub async fn authorize(
    store: &RemoteStore,
    config: &ClientConfig,
    prompt: &mut dyn AuthCodePrompt,
    force: bool,
) -> ClientResult<AuthOutcome> {
    let manager = token_manager(store, config).await?;

    if !force && manager.cached_token().await.is_some_and(|t| is_usable(&t)) {
        return Ok(AuthOutcome::AlreadyAuthorized);
    }

    manager.authorize(prompt).await?;
    info!("Google authorization successful");

    Ok(AuthOutcome::Authorized)
}

/// An expired token is still usable while it can be refreshed.
fn is_usable(token: &TokenInfo) -> bool {
    !token.is_expired() || token.refresh_token.is_some()
}
