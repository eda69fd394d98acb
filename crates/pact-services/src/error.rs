//! Errors for the pact collection client and form validation.

use thiserror::Error;

/// Failure talking to the remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The server answered with a non-2xx status. The body is not inspected.
    #[error("HTTP {0}")]
    HttpStatus(u16),

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// A 2xx response whose body was not the expected JSON.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::HttpStatus(404) => "Pact not found".to_string(),
            Self::HttpStatus(code) if *code >= 500 => {
                format!("Server error (HTTP {}). Please try again later.", code)
            }
            Self::HttpStatus(code) => format!("Request rejected (HTTP {})", code),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Decode(_) => "The server sent an unexpected response".to_string(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Self::HttpStatus(status.as_u16())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Form input rejected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields(_) => "Name, description, and category are required".to_string(),
            Self::InvalidDate(_) => {
                "Invalid date format. Please use ISO 8601 (e.g., 2025-08-09T21:45:00Z).".to_string()
            }
        }
    }
}
