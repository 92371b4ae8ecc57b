//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use ajok_domain::AjokError;
use keyring::Error as KeyringError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AjokError);

impl From<InfraError> for AjokError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AjokError> for InfraError {
    fn from(value: AjokError) -> Self {
        InfraError(value)
    }
}

trait IntoAjokError {
    fn into_ajok(self) -> AjokError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → AjokError */
/* -------------------------------------------------------------------------- */

impl IntoAjokError for KeyringError {
    fn into_ajok(self) -> AjokError {
        use KeyringError::*;

        let description = self.to_string();

        match self {
            NoEntry => AjokError::NotFound("keychain entry not found".into()),
            BadEncoding(_) => {
                AjokError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => AjokError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                AjokError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => AjokError::Storage(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => AjokError::Storage(format!("keychain platform error: {err}")),
            NoStorageAccess(err) => {
                AjokError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => AjokError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_ajok())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → AjokError */
/* -------------------------------------------------------------------------- */

impl IntoAjokError for HttpError {
    fn into_ajok(self) -> AjokError {
        if self.is_timeout() {
            return AjokError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return AjokError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return AjokError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return AjokError::InvalidInput(format!("unexpected response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => AjokError::Auth(message),
                404 => AjokError::NotFound(message),
                400..=499 => AjokError::InvalidInput(message),
                _ => AjokError::Network(message),
            };
        }

        AjokError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_ajok())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error / serde_json::Error → AjokError */
/* -------------------------------------------------------------------------- */

impl IntoAjokError for IoError {
    fn into_ajok(self) -> AjokError {
        match self.kind() {
            ErrorKind::NotFound => AjokError::NotFound(self.to_string()),
            _ => AjokError::Storage(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_ajok())
    }
}

impl IntoAjokError for JsonError {
    fn into_ajok(self) -> AjokError {
        if self.is_io() {
            AjokError::Storage(self.to_string())
        } else {
            AjokError::InvalidInput(format!("malformed JSON: {self}"))
        }
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_ajok())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
