//! Client error types.

use fireman_providers::ProviderError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage, OAuth or Calendar API error.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = ClientError::Config("storage.bucket is required".to_string());
        assert_eq!(err.to_string(), "configuration error: storage.bucket is required");

        let err: ClientError = ProviderError::not_found("calendar missing").into();
        assert_eq!(err.to_string(), ProviderError::not_found("calendar missing").to_string());
    }
}
