//! View models for the pact calendar and table.
//!
//! Views own their state and are driven from a single loop. Network work is
//! spawned on the shared runtime and reported back over a per-view channel;
//! call `poll_channel` (or await `next_update`) to apply results.

pub mod app_services;
pub mod error_mapping;
pub mod models;
pub mod render;
pub mod services;

pub use app_services::{AppServices, ViewContext, ViewSettings};
pub use models::calendar_model::{CalendarUpdate, CalendarView};
pub use models::table_model::{Confirm, TableUpdate, TableView};
pub use services::{CalendarError, TableError};
