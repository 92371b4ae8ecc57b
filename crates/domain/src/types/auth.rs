//! Credential and token exchange types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Access/refresh token pair as persisted in the token store.
///
/// Either half may be missing: a fresh install has neither, and a session
/// whose refresh failed has both cleared.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// An access token is present (it may still be expired server-side).
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// `Authorization` header value for the current access token.
    pub fn bearer(&self) -> Option<String> {
        self.access_token.as_deref().map(bearer)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Format a token as an `Authorization` header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Body of `POST /users/token/`; the backend expects the email as `username`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Tokens issued by login and registration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    /// Human-readable message the registration endpoint adds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&TokenPair> for Credentials {
    fn from(pair: &TokenPair) -> Self {
        Credentials::new(pair.access.clone(), pair.refresh.clone())
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .field("detail", &self.detail)
            .finish()
    }
}

/// Body of `POST /users/token/refresh/`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest").field("refresh", &"<redacted>").finish()
    }
}

/// Response of `POST /users/token/refresh/`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshedAccess {
    pub access: String,
    /// Present only when the backend rotates refresh tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl fmt::Debug for RefreshedAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshedAccess")
            .field("access", &"<redacted>")
            .field("rotated", &self.refresh.is_some())
            .finish()
    }
}

/// Registration form. `password2` must repeat `password`; the backend uses
/// the email as username when `username` is omitted.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
    pub password2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl RegisterRequest {
    /// Local check mirroring the backend's "Passwords do not match." rule.
    pub fn passwords_match(&self) -> bool {
        self.password == self.password2
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /users/change_password/`.
#[derive(Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordRequest").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_secrets() {
        let creds = Credentials::new("acc-123", "ref-456");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("acc-123"));
        assert!(!rendered.contains("ref-456"));

        let login = LoginRequest { username: "a@b.c".into(), password: "hunter2".into() };
        assert!(!format!("{login:?}").contains("hunter2"));
    }

    #[test]
    fn bearer_header_uses_access_token() {
        assert_eq!(Credentials::new("abc", "def").bearer().as_deref(), Some("Bearer abc"));
        assert_eq!(Credentials::default().bearer(), None);
    }

    #[test]
    fn registration_response_carries_detail() {
        let pair: TokenPair = serde_json::from_str(
            r#"{"access":"a","refresh":"r","detail":"Registration successful."}"#,
        )
        .unwrap();
        assert_eq!(pair.detail.as_deref(), Some("Registration successful."));
        assert_eq!(Credentials::from(&pair), Credentials::new("a", "r"));
    }

    #[test]
    fn register_request_omits_unset_optionals() {
        let request = RegisterRequest {
            email: "new@homes.test".into(),
            password: "pw".into(),
            password2: "pw".into(),
            ..Default::default()
        };
        assert!(request.passwords_match());

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("username").is_none());
        assert!(json.get("phone_number").is_none());
    }
}
