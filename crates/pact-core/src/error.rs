//! Centralized error types for the Pact client.
//!
//! Every error surfaced to a view is convertible to [`AppError`], which knows
//! how to phrase itself for display. The full error is kept for logging.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Form input rejected before any request was sent.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Service-level errors mapped from UI crates.
    #[error("Service error: {0}")]
    Service(String),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Validation(_) => "Some fields are missing or invalid.",
            AppError::Service(_) => "Something went wrong. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Server error: {status}")]
    ServerError { status: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to reach the pact server. Check that it is running."
            }
            NetworkError::ServerError { status } if *status == 404 => {
                "That pact no longer exists. Refresh the list."
            }
            NetworkError::ServerError { status } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request was rejected. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_conversion() {
        let app_err: AppError = NetworkError::ServerError { status: 503 }.into();
        assert!(matches!(
            app_err,
            AppError::Network(NetworkError::ServerError { status: 503 })
        ));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Network(NetworkError::ServerError { status: 500 });
        assert_eq!(
            app_err.user_message(),
            "The server is experiencing issues. Please try again later."
        );

        let not_found = AppError::Network(NetworkError::ServerError { status: 404 });
        assert!(not_found.user_message().contains("no longer exists"));
    }

    #[test]
    fn test_config_error_conversion() {
        let app_err: AppError = ConfigError::Invalid("base_url: not a URL".into()).into();
        assert_eq!(
            app_err.user_message(),
            "Invalid configuration. Check your settings."
        );
        assert!(app_err.to_string().contains("base_url: not a URL"));
    }

    #[test]
    fn test_display_keeps_detail() {
        let err = AppError::Validation("name is required".into());
        assert!(err.to_string().contains("name is required"));
    }
}
