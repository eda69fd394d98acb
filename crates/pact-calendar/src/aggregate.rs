//! Group pacts by calendar day and annotate a month grid with them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use pact_services::{CalendarZone, Pact};

use crate::color::{color_for_pact, Color};
use crate::grid::MonthGrid;

/// Day key to the pacts on that day, in collection order.
pub type DayBuckets = BTreeMap<NaiveDate, Vec<Pact>>;

/// Bucket pacts by day. Pacts without a usable date are skipped.
pub fn aggregate(pacts: &[Pact], zone: &CalendarZone) -> DayBuckets {
    let mut buckets = DayBuckets::new();
    let mut skipped = 0usize;

    for pact in pacts {
        match pact.day_key(zone) {
            Some(day) => buckets.entry(day).or_default().push(pact.clone()),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("{} pacts without a usable date left off the calendar", skipped);
    }
    buckets
}

/// One day of a rendered month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub pacts: Vec<Pact>,
    pub has_activity: bool,
    pub is_today: bool,
}

impl DayCell {
    pub fn names(&self) -> Vec<&str> {
        self.pacts
            .iter()
            .map(|p| p.name.as_str())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Accessible summary, e.g. "Pacts: Run 5k, Read".
    pub fn summary(&self) -> String {
        let names = self.names();
        if names.is_empty() {
            "No pacts".to_string()
        } else {
            format!("Pacts: {}", names.join(", "))
        }
    }

    pub fn colors(&self) -> Vec<Color> {
        self.pacts.iter().map(color_for_pact).collect()
    }
}

/// A grid week with `None` for the padding slots.
pub type AnnotatedWeek = [Option<DayCell>; 7];

/// Attach buckets to the grid's days.
///
/// With `baseline_activity` set every day carries the activity marker;
/// otherwise only days with at least one pact do.
pub fn annotate(
    grid: &MonthGrid,
    buckets: &DayBuckets,
    today: NaiveDate,
    baseline_activity: bool,
) -> Vec<AnnotatedWeek> {
    grid.weeks
        .iter()
        .map(|week| {
            week.map(|slot| {
                slot.date().map(|date| {
                    let pacts = buckets.get(&date).cloned().unwrap_or_default();
                    DayCell {
                        has_activity: baseline_activity || !pacts.is_empty(),
                        is_today: date == today,
                        date,
                        pacts,
                    }
                })
            })
        })
        .collect()
}
