//! Refresh-token exchange against `POST /users/token/refresh/`

use ajok_core::{RefreshError, TokenRefresher};
use ajok_domain::constants::TOKEN_REFRESH_PATH;
use ajok_domain::{RefreshRequest, RefreshedAccess};
use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, instrument};

use crate::http::HttpClient;

/// Calls the refresh endpoint without a bearer token.
///
/// Any non-success status or transport failure is a rejection; the
/// coordinator treats both the same way.
pub struct HttpTokenRefresher {
    http: HttpClient,
    url: String,
}

impl HttpTokenRefresher {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        let url = format!("{}{}", base_url.trim_end_matches('/'), TOKEN_REFRESH_PATH);
        Self { http, url }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedAccess, RefreshError> {
        let body = RefreshRequest { refresh: refresh_token.to_string() };
        let builder = self.http.request(Method::POST, &self.url).json(&body);

        let response = self
            .http
            .send(builder)
            .await
            .map_err(|err| RefreshError::Rejected(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "refresh token rejected");
            return Err(RefreshError::Rejected(format!("HTTP {}", status.as_u16())));
        }

        response
            .json::<RefreshedAccess>()
            .await
            .map_err(|err| RefreshError::Rejected(format!("invalid refresh response: {err}")))
    }
}
