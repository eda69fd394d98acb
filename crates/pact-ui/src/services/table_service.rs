//! Table backend: list and mutations run on the shared runtime, results come
//! back over the view's channel.

use pact_services::{
    Pact, PactCreateRequest, PactQuery, PactUpdateRequest, RemoteError, ValidationError,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::app_services::ViewContext;

/// Error type for table operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Input rejected before sending.
    Validation(ValidationError),
    Remote(RemoteError),
    /// No cached pact with this id.
    UnknownPact(String),
    /// Another edit or delete is pending on this row.
    RowBusy(String),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::Validation(e) => write!(f, "{}", e),
            TableError::Remote(e) => write!(f, "Pact request failed: {}", e),
            TableError::UnknownPact(id) => write!(f, "No pact with id {}", id),
            TableError::RowBusy(id) => write!(f, "Pact {} has an operation in progress", id),
        }
    }
}

impl std::error::Error for TableError {}

impl From<RemoteError> for TableError {
    fn from(e: RemoteError) -> Self {
        TableError::Remote(e)
    }
}

impl From<ValidationError> for TableError {
    fn from(e: ValidationError) -> Self {
        TableError::Validation(e)
    }
}

/// Messages sent from async operations back to the table view.
#[derive(Debug)]
pub enum TableServiceMessage {
    FetchDone {
        generation: u64,
        result: Result<Vec<Pact>, TableError>,
    },
    CreateDone(Result<Pact, TableError>),
    UpdateDone {
        id: String,
        result: Result<Pact, TableError>,
    },
    DeleteDone {
        id: String,
        result: Result<(), TableError>,
    },
}

/// Run `work` unless the view goes away first; send its message if the view
/// is still alive when it completes.
fn spawn_reporting<F>(ctx: &ViewContext, tx: &UnboundedSender<TableServiceMessage>, work: F)
where
    F: std::future::Future<Output = TableServiceMessage> + Send + 'static,
{
    let tx = tx.clone();
    let cancel = ctx.cancel.clone();

    ctx.runtime.spawn(async move {
        let msg = tokio::select! {
            _ = cancel.cancelled() => return,
            msg = work => msg,
        };
        if cancel.is_cancelled() {
            return;
        }
        let _ = tx.send(msg);
    });
}

pub fn request_fetch(
    ctx: &ViewContext,
    tx: &UnboundedSender<TableServiceMessage>,
    generation: u64,
    query: PactQuery,
) {
    let client = ctx.client.clone();
    spawn_reporting(ctx, tx, async move {
        let result = client.list(&query).await.map_err(TableError::from);
        TableServiceMessage::FetchDone { generation, result }
    });
}

pub fn request_create(
    ctx: &ViewContext,
    tx: &UnboundedSender<TableServiceMessage>,
    request: PactCreateRequest,
) {
    let client = ctx.client.clone();
    spawn_reporting(ctx, tx, async move {
        let result = client.create(&request).await.map_err(TableError::from);
        TableServiceMessage::CreateDone(result)
    });
}

pub fn request_update(
    ctx: &ViewContext,
    tx: &UnboundedSender<TableServiceMessage>,
    id: String,
    request: PactUpdateRequest,
) {
    let client = ctx.client.clone();
    spawn_reporting(ctx, tx, async move {
        let result = client.update(&id, &request).await.map_err(TableError::from);
        TableServiceMessage::UpdateDone { id, result }
    });
}

pub fn request_delete(ctx: &ViewContext, tx: &UnboundedSender<TableServiceMessage>, id: String) {
    let client = ctx.client.clone();
    spawn_reporting(ctx, tx, async move {
        let result = client.delete(&id).await.map_err(TableError::from);
        TableServiceMessage::DeleteDone { id, result }
    });
}
