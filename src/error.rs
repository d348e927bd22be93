//! Error types for the sales console.

/// Generic message shown when the backend gives no usable explanation.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Text suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Validation(e) => e.to_string(),
            Self::Config(e) => e.to_string(),
            Self::Io(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Client-side validation failures. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{language} is already the primary language")]
    LanguageConflict { language: String },

    #[error("{field} is out of range: {message}")]
    OutOfRange { field: &'static str, message: String },

    #[error("{field} is invalid: {reason}")]
    InvalidFormat { field: &'static str, reason: String },
}

/// Errors from talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Backend returned {status}: {}", message.as_deref().unwrap_or("no message"))]
    Backend { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The backend's own message when it sent one, otherwise a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Please log in again.".to_string(),
            Self::Backend {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Result type alias for the console.
pub type Result<T> = std::result::Result<T, Error>;
