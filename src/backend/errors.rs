//! Backend error types and the user-facing error classifier.
//!
//! # Classification order (first match wins)
//! ```text
//! transport failure, or message mentions "fetch"  → NetworkUnreachable
//! code PGRST116                                   → NoData
//! code 23503 + registrations_course_id_fkey       → CourseHasRegistrations
//! code 23503                                      → ReferencedByOtherRecords
//! anything else                                   → Generic (raw message or fallback)
//! ```
//!
//! The "fetch" substring check is a best-effort heuristic: a backend message
//! that happens to contain the word is classified as a network failure.

use serde_json::Value;
use thiserror::Error;

use crate::transport::TransportError;

/// PostgREST: the request asked for a single object but zero rows matched.
pub const CODE_NO_ROWS: &str = "PGRST116";
/// PostgreSQL: foreign key violation.
pub const CODE_FOREIGN_KEY_VIOLATION: &str = "23503";
/// Constraint linking a registration to the course it applies for.
pub const COURSE_REGISTRATION_CONSTRAINT: &str = "registrations_course_id_fkey";

pub const MSG_NETWORK: &str =
    "Network connection error. Please check your internet connection and try again.";
pub const MSG_NO_DATA: &str = "No data available at the moment.";
pub const MSG_COURSE_HAS_REGISTRATIONS: &str = "Cannot delete this course because there are student registrations associated with it. Please delete or reassign the registrations first, then try again.";
pub const MSG_REFERENCED: &str = "Cannot delete this item because it is referenced by other records. Please remove the related records first.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred";

/// Error payload returned by the hosted backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub code: Option<String>,
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl BackendError {
    /// Decode an error body. REST errors carry `code`/`message`, auth errors
    /// use `msg`, `error_description` or `error`, and codes may be numeric.
    /// Bodies that are not JSON objects keep their text as the message.
    pub fn from_body(body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(v @ Value::Object(_)) => v,
            _ => {
                return Self {
                    message: String::from_utf8_lossy(body).trim().to_string(),
                    ..Self::default()
                }
            }
        };

        let text = |key: &str| match value.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let message = ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|key| text(*key))
            .unwrap_or_default();

        Self {
            code: text("code").or_else(|| text("error_code")),
            message,
            details: text("details"),
            hint: text("hint"),
        }
    }
}

/// Errors returned by `BackendClient` operations.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("backend returned {status}: {error}")]
    Backend { status: u16, error: BackendError },

    #[error("failed to decode {resource} response: {reason}")]
    Decode { resource: String, reason: String },

    #[error("failed to encode request body: {0}")]
    Encode(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("not signed in")]
    NotSignedIn,
}

impl ClientError {
    /// Backend error code, if the backend supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Backend { error, .. } => error.code.as_deref(),
            _ => None,
        }
    }
}

/// An error reduced to the fields the classifier looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: Option<String>,
    pub code: Option<String>,
    pub transport_failure: bool,
}

impl ErrorReport {
    pub fn new(message: Option<&str>, code: Option<&str>) -> Self {
        Self {
            message: message.map(str::to_string),
            code: code.map(str::to_string),
            transport_failure: false,
        }
    }
}

impl From<&TransportError> for ErrorReport {
    fn from(e: &TransportError) -> Self {
        Self {
            message: Some(e.to_string()),
            code: None,
            transport_failure: e.is_transient(),
        }
    }
}

impl From<&BackendError> for ErrorReport {
    fn from(e: &BackendError) -> Self {
        Self {
            message: Some(e.message.clone()).filter(|m| !m.is_empty()),
            code: e.code.clone(),
            transport_failure: false,
        }
    }
}

impl From<&ClientError> for ErrorReport {
    fn from(e: &ClientError) -> Self {
        match e {
            ClientError::Transport(t) => t.into(),
            ClientError::Backend { error, .. } => error.into(),
            other => Self {
                message: Some(other.to_string()),
                ..Self::default()
            },
        }
    }
}

/// Stable user-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NetworkUnreachable,
    NoData,
    CourseHasRegistrations,
    ReferencedByOtherRecords,
    Generic,
}

/// Result of classifying an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: ErrorCategory,
    pub message: String,
}

/// Map an error to its category and display message.
pub fn classify(report: &ErrorReport) -> Classification {
    tracing::error!(
        code = report.code.as_deref().unwrap_or("-"),
        message = report.message.as_deref().unwrap_or("-"),
        transport_failure = report.transport_failure,
        "Backend error"
    );

    let message = report.message.as_deref().unwrap_or("");
    let code = report.code.as_deref();

    let (category, text) = if report.transport_failure || message.contains("fetch") {
        (ErrorCategory::NetworkUnreachable, MSG_NETWORK.to_string())
    } else if code == Some(CODE_NO_ROWS) {
        (ErrorCategory::NoData, MSG_NO_DATA.to_string())
    } else if code == Some(CODE_FOREIGN_KEY_VIOLATION) {
        if message.contains(COURSE_REGISTRATION_CONSTRAINT) {
            (
                ErrorCategory::CourseHasRegistrations,
                MSG_COURSE_HAS_REGISTRATIONS.to_string(),
            )
        } else {
            (ErrorCategory::ReferencedByOtherRecords, MSG_REFERENCED.to_string())
        }
    } else if !message.is_empty() {
        (ErrorCategory::Generic, message.to_string())
    } else {
        (ErrorCategory::Generic, MSG_UNEXPECTED.to_string())
    };

    Classification {
        category,
        message: text,
    }
}

/// Shorthand for the display message of any classifiable error.
pub fn user_message<'a, E>(error: &'a E) -> String
where
    &'a E: Into<ErrorReport>,
{
    classify(&error.into()).message
}
