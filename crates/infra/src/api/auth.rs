//! Authentication endpoints (`/users/...`)

use ajok_domain::constants::{
    CHANGE_PASSWORD_PATH, ME_PATH, REGISTER_PATH, TOKEN_PATH, UPDATE_PROFILE_PATH,
};
use ajok_domain::{ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, TokenPair, User};
use serde::de::IgnoredAny;
use tracing::{info, instrument};

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::ApiRequest;

/// Sign-in, registration and profile calls.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange email and password for tokens and start a session.
    ///
    /// Sent without a bearer token; a 401 here means bad credentials and is
    /// returned as [`ApiError::Http`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ApiError> {
        let body = LoginRequest { username: email.to_string(), password: password.to_string() };
        let tokens: TokenPair =
            self.client.execute(ApiRequest::post(TOKEN_PATH).with_body(&body)?.anonymous()).await?;

        self.client.begin_session(&tokens).await?;
        info!("signed in");
        Ok(tokens)
    }

    /// Create an account and start a session with the issued tokens.
    ///
    /// # Errors
    /// `ApiError::InvalidInput` if the two passwords differ (nothing is sent)
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<TokenPair, ApiError> {
        if !request.passwords_match() {
            return Err(ApiError::InvalidInput("Passwords do not match.".into()));
        }

        let tokens: TokenPair = self
            .client
            .execute(ApiRequest::post(REGISTER_PATH).with_body(request)?.anonymous())
            .await?;

        self.client.begin_session(&tokens).await?;
        info!("account registered");
        Ok(tokens)
    }

    /// Sign in, then fetch the profile to learn the role.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, ApiError> {
        self.login(email, password).await?;
        self.profile().await
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        self.client.get(ME_PATH).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.client.put(UPDATE_PROFILE_PATH, update).await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ApiError> {
        self.client.post::<_, IgnoredAny>(CHANGE_PASSWORD_PATH, request).await.map(|_| ())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client.logout().await
    }

    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        self.client.is_authenticated().await
    }
}
