//! Port interfaces for session management
//!
//! These traits define the boundaries between the refresh logic and the
//! infrastructure that persists tokens, talks to the backend, and reacts to
//! the session ending.

use std::time::Duration;

use ajok_domain::{AjokError, RefreshedAccess, Result};
use async_trait::async_trait;
use thiserror::Error;

/// Key/value persistence for credentials (`token`, `refreshToken`).
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> std::result::Result<RefreshedAccess, RefreshError>;
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogoutReason {
    /// Explicit sign-out
    UserInitiated,
    /// A 401 arrived and no refresh token was stored
    MissingRefreshToken,
    /// The backend (or transport) rejected the refresh call
    RefreshRejected,
    RefreshTimedOut,
    /// New tokens could not be persisted
    StoreFailure,
    /// A request was still unauthorized after replaying with a fresh token
    Unauthorized,
}

impl From<&RefreshError> for LogoutReason {
    fn from(err: &RefreshError) -> Self {
        match err {
            RefreshError::MissingRefreshToken => LogoutReason::MissingRefreshToken,
            RefreshError::Rejected(_) => LogoutReason::RefreshRejected,
            RefreshError::TimedOut(_) => LogoutReason::RefreshTimedOut,
            RefreshError::Store(_) => LogoutReason::StoreFailure,
            RefreshError::SessionEnded => LogoutReason::UserInitiated,
        }
    }
}

/// Receives session transitions; logout is the side effect the application
/// reacts to (navigate to sign-in, drop cached user).
pub trait SessionListener: Send + Sync {
    fn on_logout(&self, reason: LogoutReason);

    fn on_login(&self) {}
}

/// Listener for callers that do not react to logout.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSessionListener;

impl SessionListener for NoopSessionListener {
    fn on_logout(&self, _reason: LogoutReason) {}
}

/// Outcome of a failed token refresh, delivered to every queued request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("no refresh token available")]
    MissingRefreshToken,

    #[error("token refresh rejected: {0}")]
    Rejected(String),

    #[error("token refresh timed out after {0:?}")]
    TimedOut(Duration),

    #[error("token store error: {0}")]
    Store(AjokError),

    /// The session was ended while this refresh was pending
    #[error("session ended while token refresh was in flight")]
    SessionEnded,
}
