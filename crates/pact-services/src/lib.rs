pub mod client;
pub mod error;
pub mod pact;

pub use client::{PactClient, PactClientConfig};
pub use error::{RemoteError, ValidationError};
pub use pact::{
    CalendarZone, Pact, PactCreateRequest, PactDraft, PactEdit, PactQuery, PactTimestamp,
    PactUpdateRequest, SortDirection,
};
