//! Filterable table of pacts with create, edit and delete.
//!
//! The table is the system of record for errors: list and create failures
//! land in inline slots, edit and delete failures in a blocking notice.
//! Mutations update the cache from the server response instead of
//! re-fetching, then announce the change on the sync bus.

use pact_core::{AppError, PendingOps, RowOp, ViewSyncEvent};
use pact_services::{Pact, PactDraft, PactEdit, PactQuery, SortDirection};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::app_services::ViewContext;
use crate::services::table_service::{
    request_create, request_delete, request_fetch, request_update, TableError,
    TableServiceMessage,
};

/// A blocking yes/no prompt shown before destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// What applying one service message did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableUpdate {
    Loaded(usize),
    /// Result of a superseded query, or arrived after unmount; dropped.
    Stale,
    LoadFailed,
    Created(String),
    CreateFailed,
    Updated(String),
    UpdateFailed(String),
    Deleted(String),
    DeleteFailed(String),
}

pub struct TableView {
    ctx: ViewContext,
    query: PactQuery,
    pacts: Vec<Pact>,
    loading: bool,
    latest_fetch: u64,

    draft: PactDraft,
    form_open: bool,
    creating: bool,
    ops: PendingOps,

    error: Option<String>,
    submit_error: Option<String>,
    notice: Option<String>,

    tx: UnboundedSender<TableServiceMessage>,
    rx: UnboundedReceiver<TableServiceMessage>,
}

impl TableView {
    /// Mount with the default query (newest first) and start the first fetch.
    pub fn mount(ctx: &ViewContext) -> Self {
        let ctx = ctx.for_view();
        let (tx, rx) = mpsc::unbounded_channel();
        let query = PactQuery::recent(ctx.settings.page_size);

        let mut view = Self {
            ctx,
            query,
            pacts: Vec::new(),
            loading: false,
            latest_fetch: 0,
            draft: PactDraft::default(),
            form_open: false,
            creating: false,
            ops: PendingOps::new(),
            error: None,
            submit_error: None,
            notice: None,
            tx,
            rx,
        };
        view.refresh();
        view
    }

    /// Re-issue the current query. Any fetch still in flight is superseded.
    pub fn refresh(&mut self) {
        self.latest_fetch += 1;
        self.loading = true;
        self.error = None;
        request_fetch(&self.ctx, &self.tx, self.latest_fetch, self.query.clone());
    }

    pub fn set_name_filter(&mut self, name_prefix: &str) {
        if self.query.name_prefix != name_prefix {
            self.query.name_prefix = name_prefix.to_string();
            self.refresh();
        }
    }

    pub fn set_category_filter(&mut self, category: &str) {
        if self.query.category != category {
            self.query.category = category.to_string();
            self.refresh();
        }
    }

    pub fn set_sort(&mut self, sort: SortDirection) {
        if self.query.sort != sort {
            self.query.sort = sort;
            self.refresh();
        }
    }

    pub fn open_form(&mut self) {
        self.form_open = true;
    }

    pub fn close_form(&mut self) {
        self.form_open = false;
        self.submit_error = None;
    }

    pub fn draft_mut(&mut self) -> &mut PactDraft {
        &mut self.draft
    }

    /// Validate the draft and send it. Returns `Ok(false)` when a create is
    /// already in flight and nothing was sent.
    ///
    /// # Errors
    /// `Validation` if required fields are blank or the date is unparsable;
    /// nothing is sent in that case.
    pub fn submit_create(&mut self) -> Result<bool, TableError> {
        if self.creating {
            tracing::debug!("Create already pending, ignoring resubmit");
            return Ok(false);
        }

        let request = match self.draft.validate(&self.ctx.settings.zone) {
            Ok(request) => request,
            Err(e) => {
                self.submit_error = Some(e.user_message());
                return Err(e.into());
            }
        };

        self.submit_error = None;
        self.creating = true;
        request_create(&self.ctx, &self.tx, request);
        Ok(true)
    }

    /// Edit form values prefilled from the cached record.
    pub fn edit_form(&self, id: &str) -> Option<PactEdit> {
        self.find(id)
            .map(|pact| PactEdit::from_pact(pact, &self.ctx.settings.zone))
    }

    /// Send the fields of `edit` that differ from the cached record.
    /// Returns `Ok(false)` when nothing changed and no request was made.
    ///
    /// # Errors
    /// `UnknownPact`, `RowBusy`, or `Validation` for an unparsable date.
    pub fn edit(&mut self, id: &str, edit: &PactEdit) -> Result<bool, TableError> {
        let original = self
            .find(id)
            .ok_or_else(|| TableError::UnknownPact(id.to_string()))?;
        if !self.ops.can_start(id) {
            return Err(TableError::RowBusy(id.to_string()));
        }

        let update = match edit.diff(original, &self.ctx.settings.zone) {
            Ok(update) => update,
            Err(e) => {
                self.notice = Some(e.user_message());
                return Err(e.into());
            }
        };

        if update.is_empty() {
            tracing::debug!("Edit of {} changed nothing, not sending", id);
            return Ok(false);
        }

        self.ops.start(id, RowOp::Editing);
        request_update(&self.ctx, &self.tx, id.to_string(), update);
        Ok(true)
    }

    /// Delete after `confirm` agrees. Returns `Ok(false)` if declined.
    ///
    /// # Errors
    /// `UnknownPact` or `RowBusy`.
    pub fn delete(&mut self, id: &str, confirm: &impl Confirm) -> Result<bool, TableError> {
        let name = self
            .find(id)
            .map(|pact| pact.name.clone())
            .ok_or_else(|| TableError::UnknownPact(id.to_string()))?;
        if !self.ops.can_start(id) {
            return Err(TableError::RowBusy(id.to_string()));
        }

        if !confirm.confirm(&format!("Delete \"{}\"?", name)) {
            return Ok(false);
        }

        self.ops.start(id, RowOp::Deleting);
        request_delete(&self.ctx, &self.tx, id.to_string());
        Ok(true)
    }

    /// Apply every message that has already arrived.
    pub fn poll_channel(&mut self) -> Vec<TableUpdate> {
        let mut updates = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            updates.push(self.apply(msg));
        }
        updates
    }

    /// Wait for the next message and apply it.
    pub async fn next_update(&mut self) -> Option<TableUpdate> {
        let msg = self.rx.recv().await?;
        Some(self.apply(msg))
    }

    fn apply(&mut self, msg: TableServiceMessage) -> TableUpdate {
        if self.ctx.cancel.is_cancelled() {
            return TableUpdate::Stale;
        }

        match msg {
            TableServiceMessage::FetchDone { generation, result } => {
                if generation != self.latest_fetch {
                    tracing::debug!(
                        "Dropping table fetch {} (latest is {})",
                        generation,
                        self.latest_fetch
                    );
                    return TableUpdate::Stale;
                }
                self.loading = false;
                match result {
                    Ok(pacts) => {
                        self.pacts = pacts;
                        self.error = None;
                        TableUpdate::Loaded(self.pacts.len())
                    }
                    Err(e) => {
                        tracing::error!("Failed to load pacts: {}", e);
                        self.error = Some(display_message(e));
                        TableUpdate::LoadFailed
                    }
                }
            }

            TableServiceMessage::CreateDone(result) => {
                self.creating = false;
                match result {
                    Ok(pact) => {
                        let id = pact.id.clone();
                        tracing::info!("Created pact {}", id);
                        self.pacts.insert(0, pact);
                        self.draft = PactDraft::default();
                        self.form_open = false;
                        self.submit_error = None;
                        self.ctx.bus.publish(ViewSyncEvent::created(id.clone()));
                        TableUpdate::Created(id)
                    }
                    Err(e) => {
                        tracing::error!("Failed to create pact: {}", e);
                        self.submit_error = Some(display_message(e));
                        TableUpdate::CreateFailed
                    }
                }
            }

            TableServiceMessage::UpdateDone { id, result } => {
                self.ops.finish(&id);
                match result {
                    Ok(pact) => {
                        tracing::info!("Updated pact {}", id);
                        if let Some(slot) = self.pacts.iter_mut().find(|p| p.id == id) {
                            *slot = pact;
                        }
                        self.ctx.bus.publish(ViewSyncEvent::updated(id.clone()));
                        TableUpdate::Updated(id)
                    }
                    Err(e) => {
                        tracing::error!("Failed to update pact {}: {}", id, e);
                        self.notice = Some(display_message(e));
                        TableUpdate::UpdateFailed(id)
                    }
                }
            }

            TableServiceMessage::DeleteDone { id, result } => {
                self.ops.finish(&id);
                match result {
                    Ok(()) => {
                        tracing::info!("Deleted pact {}", id);
                        self.pacts.retain(|p| p.id != id);
                        self.ctx.bus.publish(ViewSyncEvent::deleted(id.clone()));
                        TableUpdate::Deleted(id)
                    }
                    Err(e) => {
                        tracing::error!("Failed to delete pact {}: {}", id, e);
                        self.notice = Some(display_message(e));
                        TableUpdate::DeleteFailed(id)
                    }
                }
            }
        }
    }

    fn find(&self, id: &str) -> Option<&Pact> {
        self.pacts.iter().find(|p| p.id == id)
    }

    pub fn query(&self) -> &PactQuery {
        &self.query
    }

    pub fn pacts(&self) -> &[Pact] {
        &self.pacts
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    pub fn draft(&self) -> &PactDraft {
        &self.draft
    }

    pub fn can_edit(&self, id: &str) -> bool {
        self.ops.can_start(id)
    }

    pub fn can_delete(&self, id: &str) -> bool {
        self.ops.can_start(id)
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.ops.is_editing(id)
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.ops.is_deleting(id)
    }

    /// Inline list error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Inline create-form error.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Take the pending blocking notice, if any, for display.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn unmount(&mut self) {
        self.ctx.cancel.cancel();
    }
}

impl Drop for TableView {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn display_message(e: TableError) -> String {
    let detail = e.to_string();
    let app: AppError = e.into();
    format!("{} ({})", app.user_message(), detail)
}
