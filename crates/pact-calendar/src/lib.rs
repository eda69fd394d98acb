//! Month grid and per-day aggregation for the pact calendar.
//!
//! Everything here is pure: a month plus a slice of pacts in, a grid of
//! annotated day cells out.

pub mod aggregate;
pub mod color;
pub mod grid;

pub use aggregate::{aggregate, annotate, AnnotatedWeek, DayBuckets, DayCell};
pub use color::{category_hash, color_for, color_for_pact, Color, NEUTRAL_COLOR};
pub use grid::{build_month_grid, DaySlot, MonthGrid, MonthParseError, MonthRef, WEEKDAY_LABELS};
