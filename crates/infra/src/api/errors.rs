//! API-specific error types
//!
//! Classifies what callers of the listings backend can see: a terminal
//! session failure, an HTTP error response passed through verbatim, or a
//! local/transport failure.

use std::time::Duration;

use ajok_core::RefreshError;
use ajok_domain::AjokError;
use serde_json::Value;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// The session is gone; the user must sign in again
    Authentication,
    /// 4xx other than a recovered 401 (validation, forbidden, not found)
    Client,
    /// 5xx
    Server,
    /// Connection failures and timeouts
    Network,
    /// Local problems: configuration, token storage, undecodable responses
    Local,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Terminal authorization failure. Credentials are already cleared and
    /// the session listener notified when this is returned.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Non-success response other than a recoverable 401
    #[error("{}", describe_http(.status, .body))]
    Http { status: u16, body: Value },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::SessionExpired(_) => ApiErrorCategory::Authentication,
            Self::Http { status, .. } if *status >= 500 => ApiErrorCategory::Server,
            Self::Http { .. } | Self::InvalidInput(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Decode(_) | Self::Config(_) | Self::Store(_) => ApiErrorCategory::Local,
        }
    }

    /// HTTP status of an error response, if the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message fit for display next to a form.
    ///
    /// Backend validation errors arrive as `{"field": ["msg", ...]}` or
    /// `{"detail": "msg"}`; both are flattened into one line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { body, .. } => {
                let summary = summarize_body(body);
                if summary.is_empty() {
                    self.to_string()
                } else {
                    summary
                }
            }
            Self::SessionExpired(_) => "Your session has expired. Please sign in again.".into(),
            other => other.to_string(),
        }
    }
}

fn describe_http(status: &u16, body: &Value) -> String {
    let summary = summarize_body(body);
    if summary.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {summary}")
    }
}

fn summarize_body(body: &Value) -> String {
    match body {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Object(fields) => {
            if let Some(detail) = fields.get("detail").and_then(Value::as_str) {
                return detail.to_string();
            }
            fields
                .iter()
                .map(|(field, messages)| {
                    let text = flatten_messages(messages);
                    if field == "non_field_errors" {
                        text
                    } else {
                        format!("{field}: {text}")
                    }
                })
                .collect::<Vec<_>>()
                .join(" | ")
        }
        other => flatten_messages(other),
    }
}

fn flatten_messages(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(flatten_messages).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

impl From<AjokError> for ApiError {
    fn from(err: AjokError) -> Self {
        match err {
            AjokError::Network(msg) => Self::Network(msg),
            AjokError::Auth(msg) => Self::SessionExpired(msg),
            AjokError::Storage(msg) => Self::Store(msg),
            AjokError::Config(msg) => Self::Config(msg),
            AjokError::InvalidInput(msg) | AjokError::NotFound(msg) => Self::InvalidInput(msg),
            AjokError::Internal(msg) => Self::Config(msg),
        }
    }
}

impl From<RefreshError> for ApiError {
    fn from(err: RefreshError) -> Self {
        Self::SessionExpired(err.to_string())
    }
}
