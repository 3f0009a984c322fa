//! Unified error handling for gradebook-core
//!
//! Every failure the API can produce is mapped here, in one place, to a tagged
//! [`Error`] variant carrying a single display string.

use serde_json::Value;
use thiserror::Error;

/// Core error type for gradebook-core
#[derive(Error, Debug)]
pub enum Error {
    /// The request never reached the server
    #[error("Network error: {0}")]
    Network(String),

    /// No usable session: a 401 invalidated it or none existed. The user has
    /// been sent to `/login`.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// 401 on the token endpoint
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Persisted or received session data violates the session invariants
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for gradebook-core
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Error::Auth(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Error::Forbidden(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Create an invalid session error
    pub fn invalid_session(msg: impl Into<String>) -> Self {
        Error::InvalidSession(msg.into())
    }

    /// True for failures that force the session to end
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// HTTP status the error was mapped from, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth(_) | Error::InvalidCredentials(_) => Some(401),
            Error::Forbidden(_) => Some(403),
            Error::NotFound(_) => Some(404),
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message a form or view shows to the user, without the variant prefix
    pub fn display_message(&self) -> String {
        match self {
            Error::Network(msg)
            | Error::Auth(msg)
            | Error::InvalidCredentials(msg)
            | Error::Validation(msg)
            | Error::DuplicateEmail(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::Server { message: msg, .. } => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Network("Request timed out".to_string())
        } else if err.is_connect() {
            Error::Network("Connection failed".to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

// Convert to String for CLI and view layers
impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.display_message()
    }
}

/// Map a non-success HTTP response to a tagged error.
pub fn from_response(status: u16, body: &str) -> Error {
    let message = normalize_detail(body).unwrap_or_else(|| default_message(status));

    match status {
        401 => Error::Auth(message),
        403 => Error::Forbidden(message),
        404 => Error::NotFound(message),
        400..=499 => Error::Validation(message),
        _ => Error::Server { status, message },
    }
}

/// Collapse the server's error payload shapes into one display string.
///
/// Accepted shapes:
/// - a plain text or JSON string body
/// - `{"detail": "..."}`
/// - `{"detail": [{"msg": "..."}, ...]}` (request validation failures)
/// - `[{"msg": "..."}, ...]`
/// - `{"msg": "..."}`
///
/// Multiple messages are joined with `", "`. Returns `None` when no message
/// can be extracted.
pub fn normalize_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => message_from_value(&value),
        Err(_) => Some(trimmed.to_string()),
    }
}

fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Array(items) => {
            let messages: Vec<String> = items.iter().filter_map(message_from_value).collect();
            (!messages.is_empty()).then(|| messages.join(", "))
        }
        Value::Object(map) => ["detail", "msg", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(message_from_value)),
        _ => None,
    }
}

fn default_message(status: u16) -> String {
    match status {
        401 => "Not authenticated".to_string(),
        403 => "Access forbidden".to_string(),
        404 => "Resource not found".to_string(),
        _ => format!("Request failed with status {}", status),
    }
}
