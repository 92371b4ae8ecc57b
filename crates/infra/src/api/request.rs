//! Request descriptor and list response shapes

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ApiError;

/// How a request is authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Attach the stored access token; a 401 triggers refresh and one replay
    #[default]
    Bearer,
    /// No token and no refresh recovery (login, registration)
    Anonymous,
}

/// One logical API call.
///
/// `retried` is the single-use replay marker: set when the request is
/// replayed after a token refresh, so a second 401 is final.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Endpoint path relative to the base URL, e.g. `/users/me/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub auth: AuthMode,
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: AuthMode::Bearer,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Serialize `body` as the JSON payload.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidInput` if `body` cannot be serialized
    pub fn with_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidInput(format!("failed to serialize body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Flatten a serializable struct into query parameters.
    ///
    /// `null` fields are omitted and arrays repeat the key.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidInput` unless `params` serializes to a flat
    /// object
    pub fn with_query<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self, ApiError> {
        let value = serde_json::to_value(params)
            .map_err(|e| ApiError::InvalidInput(format!("failed to serialize query: {e}")))?;

        let fields = match value {
            Value::Object(fields) => fields,
            Value::Null => return Ok(self),
            other => {
                return Err(ApiError::InvalidInput(format!(
                    "query parameters must be an object, got {other}"
                )))
            }
        };

        for (key, value) in fields {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        self.query.push((key.clone(), query_scalar(&key, item)?));
                    }
                }
                scalar => {
                    let rendered = query_scalar(&key, scalar)?;
                    self.query.push((key, rendered));
                }
            }
        }
        Ok(self)
    }

    pub fn anonymous(mut self) -> Self {
        self.auth = AuthMode::Anonymous;
        self
    }
}

fn query_scalar(key: &str, value: Value) -> Result<String, ApiError> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => {
            Err(ApiError::InvalidInput(format!("query parameter '{key}' is not a scalar: {other}")))
        }
    }
}

/// Collection endpoints answer either with a bare array or, when pagination
/// is enabled on the backend, with a page envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paginated {
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Paginated { results, .. } => results,
            ListResponse::Plain(items) => items,
        }
    }
}
