use super::network_error;
use crate::services::table_service::TableError;
use pact_core::AppError;

impl From<TableError> for AppError {
    fn from(e: TableError) -> Self {
        match e {
            TableError::Validation(e) => AppError::Validation(e.to_string()),
            TableError::Remote(e) => AppError::Network(network_error(e)),
            TableError::UnknownPact(id) => AppError::Service(format!("Unknown pact {}", id)),
            TableError::RowBusy(id) => {
                AppError::Service(format!("Pact {} has an operation in progress", id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_core::NetworkError;
    use pact_services::{RemoteError, ValidationError};

    #[test]
    fn test_status_maps_to_server_error() {
        let app: AppError = TableError::Remote(RemoteError::HttpStatus(404)).into();
        assert!(matches!(
            app,
            AppError::Network(NetworkError::ServerError { status: 404 })
        ));
        assert!(app.user_message().contains("no longer exists"));
    }

    #[test]
    fn test_decode_maps_to_invalid_response() {
        let app: AppError = TableError::Remote(RemoteError::Decode("eof".into())).into();
        assert!(matches!(
            app,
            AppError::Network(NetworkError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_validation_keeps_detail() {
        let err = TableError::Validation(ValidationError::MissingFields(vec!["name"]));
        let app: AppError = err.into();
        assert!(app.to_string().contains("name"));
        assert_eq!(app.user_message(), "Some fields are missing or invalid.");
    }
}
