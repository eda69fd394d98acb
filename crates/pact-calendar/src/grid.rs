//! Month-shaped day grids, Monday first.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use pact_services::CalendarZone;
use thiserror::Error;

/// Column headers, Monday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthParseError {
    #[error("Expected YYYY-MM, got {0:?}")]
    Malformed(String),

    #[error("Month out of range: {0}")]
    OutOfRange(u32),
}

/// A calendar month. Always refers to a representable date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthRef {
    year: i32,
    month: u32,
}

impl MonthRef {
    /// `None` if `month` is not 1..=12 or the year is out of range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month containing today in `zone`.
    pub fn current(zone: &CalendarZone) -> Self {
        Self::of(zone.today())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Day 0 of the following month.
    pub fn days_in_month(&self) -> u32 {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .map(|d| d.day())
            .unwrap_or(31)
    }

    /// Previous month, rolling into December of the prior year.
    pub fn prev(&self) -> Self {
        let (year, month) = if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        };
        Self::new(year, month).unwrap_or(*self)
    }

    /// Next month, rolling into January of the following year.
    pub fn next(&self) -> Self {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        Self::new(year, month).unwrap_or(*self)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Parse the `YYYY-MM` value of a month picker.
    ///
    /// # Errors
    /// `Malformed` for anything that is not two dash-separated integers,
    /// `OutOfRange` for a month outside 1..=12.
    pub fn parse(input: &str) -> Result<Self, MonthParseError> {
        let malformed = || MonthParseError::Malformed(input.to_string());

        let (year, month) = input.trim().split_once('-').ok_or_else(malformed)?;
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;

        if !(1..=12).contains(&month) {
            return Err(MonthParseError::OutOfRange(month));
        }
        Self::new(year, month).ok_or_else(malformed)
    }

    /// Display title, e.g. "March 2025".
    pub fn title(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl From<NaiveDate> for MonthRef {
    fn from(date: NaiveDate) -> Self {
        Self::of(date)
    }
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySlot {
    Empty,
    Day(NaiveDate),
}

impl DaySlot {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DaySlot::Empty => None,
            DaySlot::Day(date) => Some(*date),
        }
    }
}

/// Weeks of seven slots covering one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: MonthRef,
    pub weeks: Vec<[DaySlot; 7]>,
}

impl MonthGrid {
    pub fn slots(&self) -> impl Iterator<Item = &DaySlot> {
        self.weeks.iter().flatten()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.slots().filter_map(DaySlot::date)
    }
}

/// Lay out the month containing `reference`. Only its year and month matter.
pub fn build_month_grid(reference: impl Into<MonthRef>) -> MonthGrid {
    let month = reference.into();
    let first = month.first_day();
    let leading = first.weekday().num_days_from_monday() as usize;
    let days = month.days_in_month();

    let mut slots = vec![DaySlot::Empty; leading];
    slots.extend(
        first
            .iter_days()
            .take(days as usize)
            .map(DaySlot::Day),
    );
    while slots.len() % 7 != 0 {
        slots.push(DaySlot::Empty);
    }

    let weeks = slots
        .chunks_exact(7)
        .filter_map(|week| <[DaySlot; 7]>::try_from(week).ok())
        .collect();

    MonthGrid { month, weeks }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> MonthRef {
        MonthRef::new(year, month).unwrap()
    }

    #[test]
    fn test_january_2025_layout() {
        let grid = build_month_grid(month(2025, 1));
        assert_eq!(grid.weeks.len(), 5);
        assert_eq!(grid.weeks[0][0], DaySlot::Empty);
        assert_eq!(grid.weeks[0][1], DaySlot::Empty);
        assert_eq!(
            grid.weeks[0][2],
            DaySlot::Day(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        );
        assert_eq!(grid.days().count(), 31);
        assert_eq!(grid.slots().count(), 35);
    }

    #[test]
    fn test_leap_february() {
        assert_eq!(month(2024, 2).days_in_month(), 29);
        assert_eq!(month(2023, 2).days_in_month(), 28);
        assert_eq!(month(1900, 2).days_in_month(), 28);
        assert_eq!(month(2000, 2).days_in_month(), 29);
        assert_eq!(build_month_grid(month(2024, 2)).days().count(), 29);
    }

    #[test]
    fn test_february_2021_has_no_padding() {
        let grid = build_month_grid(month(2021, 2));
        assert_eq!(grid.weeks.len(), 4);
        assert!(grid.slots().all(|slot| *slot != DaySlot::Empty));
    }

    #[test]
    fn test_grid_shape_holds_for_every_month() {
        for year in 1890..=2110 {
            for m in 1..=12 {
                let reference = month(year, m);
                let grid = build_month_grid(reference);
                let slots: Vec<DaySlot> = grid.slots().copied().collect();
                assert_eq!(slots.len() % 7, 0, "{}", reference);

                let first = slots.iter().position(|s| *s != DaySlot::Empty).unwrap();
                let last = slots.iter().rposition(|s| *s != DaySlot::Empty).unwrap();
                assert!(first < 7);
                assert!(slots.len() - 1 - last < 7);
                assert_eq!(
                    first,
                    reference.first_day().weekday().num_days_from_monday() as usize
                );

                let days: Vec<NaiveDate> = slots[first..=last]
                    .iter()
                    .map(|s| s.date().unwrap())
                    .collect();
                assert_eq!(days.len() as u32, reference.days_in_month());
                assert_eq!(days[0], reference.first_day());
                assert!(days.windows(2).all(|w| w[0].succ_opt() == Some(w[1])));
                assert!(days.iter().all(|d| reference.contains(*d)));
            }
        }
    }

    #[test]
    fn test_grid_depends_only_on_month() {
        let a = build_month_grid(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        let b = build_month_grid(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_year_rollover() {
        assert_eq!(month(2025, 1).prev(), month(2024, 12));
        assert_eq!(month(2024, 12).next(), month(2025, 1));
        assert_eq!(month(2025, 6).next().prev(), month(2025, 6));
    }

    #[test]
    fn test_parse_month_picker_value() {
        assert_eq!(MonthRef::parse("2025-03"), Ok(month(2025, 3)));
        assert_eq!(MonthRef::parse("2025-3"), Ok(month(2025, 3)));
        assert_eq!(MonthRef::parse("2025-13"), Err(MonthParseError::OutOfRange(13)));
        assert_eq!(MonthRef::parse("2025-00"), Err(MonthParseError::OutOfRange(0)));
        assert!(matches!(
            MonthRef::parse("March"),
            Err(MonthParseError::Malformed(_))
        ));
        assert!(matches!(
            MonthRef::parse(""),
            Err(MonthParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_title_and_display() {
        let m = month(2025, 3);
        assert_eq!(m.title(), "March 2025");
        assert_eq!(m.to_string(), "2025-03");
        assert_eq!(WEEKDAY_LABELS[0], "Mon");
    }
}
