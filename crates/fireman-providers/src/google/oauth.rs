//! OAuth 2.0 authorization-code flow for Google APIs.
//!
//! # Flow Overview
//!
//! 1. Build the authorization URL (offline access, so a refresh token is issued)
//! 2. Show it to the user, who approves access in a browser
//! 3. Read the authorization code the user pastes back
//! 4. Exchange the code for access and refresh tokens
//!
//! Later runs refresh the access token with the refresh token, without user
//! interaction.

use std::io::{self, BufRead, Write};

use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

use super::config::{GoogleConfig, OAuthCredentials};
use super::tokens::TokenInfo;

/// State sent with the authorization request. It is not verified: the code
/// comes back by hand, not through a redirect we receive.
pub const AUTH_STATE: &str = "state-token";

/// Source of the authorization code for the interactive flow.
pub trait AuthCodePrompt {
    /// Shows `auth_url` to the user and returns the code they enter.
    fn read_code(&mut self, auth_url: &str) -> ProviderResult<String>;
}

/// Prompts on stdout and reads the code from a line-based reader.
#[derive(Debug)]
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Creates a prompt on the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    /// Creates a prompt on the given reader and writer.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns the writer, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> AuthCodePrompt for ConsolePrompt<R, W> {
    fn read_code(&mut self, auth_url: &str) -> ProviderResult<String> {
        let io_err = |e: io::Error| {
            ProviderError::internal(format!("console I/O failed: {}", e)).with_source(e)
        };

        writeln!(
            self.output,
            "Go to the following link in your browser then type the authorization code:\n{}",
            auth_url
        )
        .map_err(io_err)?;
        self.output.flush().map_err(io_err)?;

        read_first_word(&mut self.input)
    }
}

/// Reads the first whitespace-delimited word, skipping blank lines.
fn read_first_word<R: BufRead>(input: &mut R) -> ProviderResult<String> {
    let mut line = String::new();
    loop {
        line.clear();
        let read = input.read_line(&mut line).map_err(|e| {
            ProviderError::internal(format!("unable to read authorization code: {}", e))
                .with_source(e)
        })?;

        if read == 0 {
            return Err(ProviderError::authentication(
                "unable to read authorization code: no input",
            ));
        }

        if let Some(word) = line.split_whitespace().next() {
            return Ok(word.to_string());
        }
    }
}

/// OAuth client for Google APIs.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client for the given configuration.
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            credentials: config.credentials.clone(),
            http_client,
        })
    }

    /// Builds the authorization URL the user opens in a browser.
    pub fn authorization_url(&self, scopes: &[String]) -> String {
        let scope = scopes.join(" ");
        let separator = if self.credentials.auth_url.contains('?') {
            '&'
        } else {
            '?'
        };

        format!(
            "{}{}access_type=offline&client_id={}&redirect_uri={}\
             &response_type=code&scope={}&state={}",
            self.credentials.auth_url,
            separator,
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(&self.credentials.redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(AUTH_STATE),
        )
    }

    /// Runs the interactive flow: prompts for a code and exchanges it.
    pub async fn authorize(
        &self,
        scopes: &[String],
        prompt: &mut dyn AuthCodePrompt,
    ) -> ProviderResult<TokenInfo> {
        let auth_url = self.authorization_url(scopes);
        debug!("authorization URL: {}", auth_url);

        let code = prompt.read_code(&auth_url)?;

        info!("received authorization code, exchanging for tokens...");
        self.exchange_code(&code, scopes).await
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str, scopes: &[String]) -> ProviderResult<TokenInfo> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ];

        let token_response = self.token_request(&params, "token exchange").await?;

        let mut token = TokenInfo::new(
            token_response.access_token,
            token_response.refresh_token,
            token_response.expires_in,
            scopes.to_vec(),
        )?;
        info!("successfully obtained tokens");
        if let Some(token_type) = token_response.token_type {
            token = token.with_token_type(token_type);
        }
        Ok(token)
    }

    /// Refreshes an expired access token using its refresh token.
    pub async fn refresh(&self, token: &TokenInfo) -> ProviderResult<TokenInfo> {
        let refresh_token = token.refresh_token.as_deref().ok_or_else(|| {
            ProviderError::authentication("no refresh token - re-authorization required")
        })?;

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let token_response = self.token_request(&params, "token refresh").await?;

        let fresh = token.refreshed(
            token_response.access_token,
            token_response.refresh_token,
            token_response.expires_in,
        )?;
        info!("successfully refreshed access token");
        Ok(fresh)
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> ProviderResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.credentials.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "{} failed ({}): {}",
                what, status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("invalid token response: {}", e)))
    }
}

/// Response from the token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}
