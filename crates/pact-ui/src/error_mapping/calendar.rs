use super::network_error;
use crate::services::calendar_service::CalendarError;
use pact_core::AppError;

impl From<CalendarError> for AppError {
    fn from(e: CalendarError) -> Self {
        match e {
            CalendarError::Remote(e) => AppError::Network(network_error(e)),
        }
    }
}
