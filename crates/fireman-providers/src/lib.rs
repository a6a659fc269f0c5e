//! Remote storage, OAuth token lifecycle and Google Calendar access.
//!
//! - [`store::RemoteStore`] - S3 (or in-memory) blob storage for the client
//!   configuration and the cached token
//! - [`google`] - credential loader, token manager and events client
//! - [`ProviderError`] - Error types for all of the above
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   config + token   ┌─────────────────┐
//! │   RemoteStore   │ ◄────────────────► │  TokenManager   │
//! └─────────────────┘                    └────────┬────────┘
//!                                                 │ AuthenticatedClient
//!                                                 ▼
//!                                        ┌──────────────────────┐
//!                                        │ GoogleCalendarClient │
//!                                        └────────┬─────────────┘
//!                                                 ▼
//!                                         Vec<UpcomingEvent>
//! ```

pub mod error;
pub mod google;
pub mod store;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use store::{RemoteStore, S3Location};
