//! Upcoming events command.

use std::io::{self, Write};

use fireman_core::{OutputFormat, OutputFormatter, UpcomingEvent};
use fireman_providers::RemoteStore;
use fireman_providers::google::{AuthCodePrompt, ConsolePrompt, GoogleCalendarClient};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientResult;

use super::{open_store, token_manager};

/// Lists the upcoming events and prints them to stdout.
pub async fn run(config: &ClientConfig, format: OutputFormat) -> ClientResult<()> {
    let store = open_store(config)?;
    let mut prompt = ConsolePrompt::stdio();

    let events = fetch_upcoming(&store, config, &mut prompt).await?;
    print_events(&mut io::stdout().lock(), &events, format)
}

/// Writes the formatted events and flushes the writer.
pub fn print_events(
    out: &mut impl Write,
    events: &[UpcomingEvent],
    format: OutputFormat,
) -> ClientResult<()> {
    out.write_all(OutputFormatter::new(format).format(events).as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Fetches the upcoming events, authorizing interactively when no usable
/// token is cached.
pub async fn fetch_upcoming(
    store: &RemoteStore,
    config: &ClientConfig,
    prompt: &mut dyn AuthCodePrompt,
) -> ClientResult<Vec<UpcomingEvent>> {
    let manager = token_manager(store, config).await?;
    let mut client = manager.authenticated_client(prompt).await?;

    let calendar = GoogleCalendarClient::new(manager.config());
    let events = calendar.list_upcoming_events(&mut client).await?;

    debug!(count = events.len(), "fetched upcoming events");
    Ok(events)
}
