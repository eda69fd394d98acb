//! Month calendar of pacts.
//!
//! Holds the displayed month and the last fetched pact list. The grid and day
//! buckets are derived from those two and rebuilt whenever either changes.
//! The calendar always fetches the same most-recent window regardless of the
//! month shown, so navigation never fetches. Collection changes published on
//! the bus trigger a re-fetch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use pact_calendar::{
    aggregate, annotate, build_month_grid, AnnotatedWeek, DayBuckets, MonthGrid, MonthRef,
};
use pact_core::Subscription;
use pact_services::Pact;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::app_services::ViewContext;
use crate::services::calendar_service::{request_fetch, CalendarError, CalendarServiceMessage};

/// What applying one service message did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarUpdate {
    /// Cache replaced with this many pacts.
    Loaded(usize),
    /// An older fetch landed after a newer one, or the view was unmounted;
    /// the result was dropped.
    Stale,
    /// Fetch failed; the previous cache was kept.
    LoadFailed,
}

pub struct CalendarView {
    ctx: ViewContext,
    month: MonthRef,
    grid: MonthGrid,
    pacts: Vec<Pact>,
    buckets: DayBuckets,
    last_fetch_error: Option<CalendarError>,
    issued: Arc<AtomicU64>,
    applied: u64,
    tx: UnboundedSender<CalendarServiceMessage>,
    rx: UnboundedReceiver<CalendarServiceMessage>,
    subscription: Option<Subscription>,
}

impl CalendarView {
    /// Mount on the month containing `reference` (or today), subscribe to
    /// collection changes and start the first fetch.
    pub fn mount(ctx: &ViewContext, reference: Option<NaiveDate>) -> Self {
        let ctx = ctx.for_view();
        let month = reference
            .map(MonthRef::of)
            .unwrap_or_else(|| MonthRef::current(&ctx.settings.zone));
        let (tx, rx) = mpsc::unbounded_channel();
        let issued = Arc::new(AtomicU64::new(0));

        let subscription = {
            let ctx = ctx.clone();
            let tx = tx.clone();
            let issued = issued.clone();
            ctx.bus.clone().subscribe(move |event| {
                tracing::debug!(
                    "Calendar refetching after {} {:?}",
                    event.kind,
                    event.affected_id
                );
                let generation = issued.fetch_add(1, Ordering::SeqCst) + 1;
                request_fetch(&ctx, &tx, generation);
            })
        };

        let mut view = Self {
            grid: build_month_grid(month),
            ctx,
            month,
            pacts: Vec::new(),
            buckets: DayBuckets::new(),
            last_fetch_error: None,
            issued,
            applied: 0,
            tx,
            rx,
            subscription: Some(subscription),
        };
        view.refresh();
        view
    }

    /// Re-fetch the collection.
    pub fn refresh(&mut self) {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        request_fetch(&self.ctx, &self.tx, generation);
    }

    /// Follow an externally supplied reference date. Only a change of month
    /// rebuilds and re-fetches. Returns whether the month changed.
    pub fn set_reference_date(&mut self, date: NaiveDate) -> bool {
        let month = MonthRef::of(date);
        if month == self.month {
            return false;
        }
        self.show(month);
        self.refresh();
        true
    }

    pub fn go_prev(&mut self) {
        self.show(self.month.prev());
    }

    pub fn go_next(&mut self) {
        self.show(self.month.next());
    }

    pub fn go_today(&mut self) {
        self.show(MonthRef::current(&self.ctx.settings.zone));
    }

    /// Jump to a month picked directly.
    pub fn set_month(&mut self, month: MonthRef) {
        self.show(month);
    }

    fn show(&mut self, month: MonthRef) {
        if month != self.month {
            self.month = month;
            self.grid = build_month_grid(month);
        }
    }

    /// Apply every message that has already arrived.
    pub fn poll_channel(&mut self) -> Vec<CalendarUpdate> {
        let mut updates = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            updates.push(self.apply(msg));
        }
        updates
    }

    /// Wait for the next message and apply it.
    pub async fn next_update(&mut self) -> Option<CalendarUpdate> {
        let msg = self.rx.recv().await?;
        Some(self.apply(msg))
    }

    fn apply(&mut self, msg: CalendarServiceMessage) -> CalendarUpdate {
        match msg {
            CalendarServiceMessage::FetchDone { generation, result } => {
                if self.ctx.cancel.is_cancelled() {
                    return CalendarUpdate::Stale;
                }
                if generation <= self.applied {
                    tracing::debug!(
                        "Dropping calendar fetch {} (already applied {})",
                        generation,
                        self.applied
                    );
                    return CalendarUpdate::Stale;
                }

                match result {
                    Ok(pacts) => {
                        self.applied = generation;
                        self.buckets = aggregate(&pacts, &self.ctx.settings.zone);
                        self.pacts = pacts;
                        self.last_fetch_error = None;
                        CalendarUpdate::Loaded(self.pacts.len())
                    }
                    Err(e) => {
                        tracing::warn!("{}", e);
                        self.last_fetch_error = Some(e);
                        CalendarUpdate::LoadFailed
                    }
                }
            }
        }
    }

    pub fn month(&self) -> MonthRef {
        self.month
    }

    pub fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub fn pacts(&self) -> &[Pact] {
        &self.pacts
    }

    pub fn buckets(&self) -> &DayBuckets {
        &self.buckets
    }

    pub fn pacts_on(&self, date: NaiveDate) -> &[Pact] {
        self.buckets.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Kept for diagnostics only; the calendar shows no error state.
    pub fn last_fetch_error(&self) -> Option<&CalendarError> {
        self.last_fetch_error.as_ref()
    }

    pub fn cells(&self) -> Vec<AnnotatedWeek> {
        self.cells_on(self.ctx.settings.zone.today())
    }

    pub fn cells_on(&self, today: NaiveDate) -> Vec<AnnotatedWeek> {
        annotate(
            &self.grid,
            &self.buckets,
            today,
            self.ctx.settings.baseline_activity,
        )
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop listening for changes and drop any in-flight fetch results.
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.ctx.cancel.cancel();
    }
}

impl Drop for CalendarView {
    fn drop(&mut self) {
        self.unmount();
    }
}
