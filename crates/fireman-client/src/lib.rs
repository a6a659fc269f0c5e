//! Command-line client for listing upcoming Google Calendar events.
//!
//! This crate provides the `fireman-calendar` binary. The OAuth client
//! configuration and the cached token live in S3.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
