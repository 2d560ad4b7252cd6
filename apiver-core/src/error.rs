use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Helper to create a JSON error response with a standard `{ "error": message }` body.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// Error type for descriptor groups, version extraction, and options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersioningError {
    /// An argument was empty or otherwise unusable.
    InvalidArgument(String),
    /// Positional access outside `0..len`. `index` is signed so that a
    /// negative request can be reported as given.
    IndexOutOfRange { index: i128, len: usize },
    /// The request carried more than one distinct API version.
    AmbiguousApiVersion(Vec<String>),
    /// Text that is not a valid API version.
    InvalidApiVersion(String),
    /// Options could not be loaded or parsed.
    Config(String),
    /// A descriptor failed to produce its controller.
    Controller(String),
}

impl VersioningError {
    /// HTTP status the framework pipeline should answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            VersioningError::AmbiguousApiVersion(_) | VersioningError::InvalidApiVersion(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for VersioningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersioningError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            VersioningError::IndexOutOfRange { index, len } => {
                write!(f, "Index {index} is out of range for a group of {len}")
            }
            VersioningError::AmbiguousApiVersion(values) => {
                write!(f, "Ambiguous API version: {}", values.join(", "))
            }
            VersioningError::InvalidApiVersion(text) => {
                write!(f, "Invalid API version: '{text}'")
            }
            VersioningError::Config(msg) => write!(f, "Versioning config error: {msg}"),
            VersioningError::Controller(msg) => write!(f, "Controller creation failed: {msg}"),
        }
    }
}

impl std::error::Error for VersioningError {}

impl IntoResponse for VersioningError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.to_string())
    }
}

impl From<serde_yaml::Error> for VersioningError {
    fn from(err: serde_yaml::Error) -> Self {
        VersioningError::Config(err.to_string())
    }
}

impl From<std::io::Error> for VersioningError {
    fn from(err: std::io::Error) -> Self {
        VersioningError::Config(err.to_string())
    }
}
