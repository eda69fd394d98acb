//! Maps UI service errors to pact_core::AppError for consistent user-facing messages.
//! Each service has its own module to keep mappings small and readable.

mod calendar;
mod table;

use pact_core::NetworkError;
use pact_services::RemoteError;

fn network_error(e: RemoteError) -> NetworkError {
    match e {
        RemoteError::HttpStatus(status) => NetworkError::ServerError { status },
        RemoteError::Network(s) => NetworkError::ConnectionFailed(s),
        RemoteError::Decode(s) => NetworkError::InvalidResponse(s),
    }
}
