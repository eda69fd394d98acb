//! Calendar backend: fetches run on the shared runtime, results come back
//! over the view's channel.

use pact_services::{Pact, PactQuery, RemoteError};
use tokio::sync::mpsc::UnboundedSender;

use crate::app_services::ViewContext;

/// Error type for calendar fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    Remote(RemoteError),
}

impl std::fmt::Display for CalendarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalendarError::Remote(e) => write!(f, "Calendar fetch failed: {}", e),
        }
    }
}

impl std::error::Error for CalendarError {}

impl From<RemoteError> for CalendarError {
    fn from(e: RemoteError) -> Self {
        CalendarError::Remote(e)
    }
}

/// Messages sent from async operations back to the calendar view.
#[derive(Debug)]
pub enum CalendarServiceMessage {
    FetchDone {
        generation: u64,
        result: Result<Vec<Pact>, CalendarError>,
    },
}

/// Fetch the most recent `page_size` pacts.
///
/// Nothing is sent once the view's token is cancelled.
pub fn request_fetch(
    ctx: &ViewContext,
    tx: &UnboundedSender<CalendarServiceMessage>,
    generation: u64,
) {
    let tx = tx.clone();
    let client = ctx.client.clone();
    let cancel = ctx.cancel.clone();
    let query = PactQuery::recent(ctx.settings.page_size);

    ctx.runtime.spawn(async move {
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Calendar fetch {} cancelled", generation);
                return;
            }
            result = client.list(&query) => result.map_err(CalendarError::from),
        };

        if cancel.is_cancelled() {
            return;
        }
        let _ = tx.send(CalendarServiceMessage::FetchDone { generation, result });
    });
}
