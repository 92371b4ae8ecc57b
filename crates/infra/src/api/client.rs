//! Authenticated API client
//!
//! Every request carries `Authorization: Bearer <token>` when an access token
//! is stored. A 401 on a request that has not been replayed yet is recovered
//! locally: the request waits on the client's [`RefreshCoordinator`] (one
//! refresh call no matter how many requests fault at once) and is then
//! replayed exactly once with the new token. A 401 that lands after the
//! refresh already settled replays with the stored token instead of starting
//! another refresh. A 401 on the replay, or a failed refresh, ends the
//! session and surfaces as [`ApiError::SessionExpired`].
//! All other failures are returned to the caller unchanged.

use std::sync::Arc;
use std::time::Duration;

use ajok_core::session::{access_token, load_credentials};
use ajok_core::{
    LogoutReason, NoopSessionListener, RefreshCoordinator, RefreshPhase, SessionListener,
    TokenRefresher, TokenStore,
};
use ajok_domain::{bearer, AjokError, ApiConfig, Credentials, TokenPair};
use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::errors::ApiError;
use super::refresher::HttpTokenRefresher;
use super::request::{ApiRequest, AuthMode};
use crate::errors::InfraError;
use crate::http::HttpClient;
use crate::store::MemoryTokenStore;

/// Extra time the transport allows on top of the request timeout; the
/// request timeout itself is enforced around each dispatch.
const TRANSPORT_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Client for the listings backend.
///
/// Cloning is cheap and clones share the token store and the refresh
/// coordinator, so concurrent calls from any clone are single-flighted
/// together. Separate `build()` calls never share coordinator state.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: Arc<str>,
    request_timeout: Duration,
    store: Arc<dyn TokenStore>,
    coordinator: RefreshCoordinator,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Perform a call, recovering from one expired access token.
    ///
    /// # Errors
    /// - [`ApiError::SessionExpired`] when authorization cannot be recovered
    /// - [`ApiError::Http`] for any other non-success status
    /// - transport, timeout, store and decode failures
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute<T: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<T, ApiError> {
        let mut token = match request.auth {
            AuthMode::Bearer => access_token(self.store.as_ref()).await?,
            AuthMode::Anonymous => None,
        };

        loop {
            let response = self.dispatch(&request, token.as_deref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED || request.auth == AuthMode::Anonymous {
                return decode(response).await;
            }

            if request.retried {
                warn!("request unauthorized after token refresh; ending session");
                if let Err(err) = self.coordinator.end_session(LogoutReason::Unauthorized).await {
                    warn!(error = %err, "failed to clear credentials");
                }
                return Err(ApiError::SessionExpired(
                    "request still unauthorized after token refresh".into(),
                ));
            }

            token = Some(self.recovered_token(token.as_deref()).await?);
            request.retried = true;
        }
    }

    /// Token to replay with after `sent` was rejected.
    ///
    /// A 401 can arrive after the refresh it should have joined has already
    /// settled. If the store moved on from `sent`, reuse what it holds; if it
    /// was emptied, that session is over. Only a 401 for the token still
    /// stored waits on the coordinator.
    async fn recovered_token(&self, sent: Option<&str>) -> Result<String, ApiError> {
        match access_token(self.store.as_ref()).await? {
            Some(current) if sent != Some(current.as_str()) => {
                debug!("access token already replaced; replaying with stored token");
                Ok(current)
            }
            None if sent.is_some() => {
                debug!("session ended while request was in flight");
                Err(ApiError::SessionExpired("session ended while the request was in flight".into()))
            }
            _ => {
                debug!("access token rejected; waiting for refresh");
                Ok(self.coordinator.refreshed_token().await?)
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(ApiRequest::get(path).with_query(query)?).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::post(path).with_body(body)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::put(path).with_body(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<Value>(ApiRequest::delete(path)).await.map(|_| ())
    }

    /// Store freshly issued tokens, replacing any previous session.
    ///
    /// # Errors
    /// Returns `ApiError::Store` if the tokens cannot be persisted
    pub async fn begin_session(&self, tokens: &TokenPair) -> Result<(), ApiError> {
        self.coordinator.begin_session(&Credentials::from(tokens)).await?;
        Ok(())
    }

    /// Explicit sign-out. Cancels any refresh in flight.
    ///
    /// # Errors
    /// Returns `ApiError::Store` if the tokens cannot be removed
    pub async fn logout(&self) -> Result<(), ApiError> {
        info!("signing out");
        self.coordinator.end_session(LogoutReason::UserInitiated).await?;
        Ok(())
    }

    pub async fn credentials(&self) -> Result<Credentials, ApiError> {
        Ok(load_credentials(self.store.as_ref()).await?)
    }

    /// An access token is stored. It may still be expired server-side.
    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(access_token(self.store.as_ref()).await?.is_some())
    }

    pub fn refresh_phase(&self) -> RefreshPhase {
        self.coordinator.phase()
    }

    /// Number of refresh calls started by this client.
    pub fn refreshes_started(&self) -> u64 {
        self.coordinator.refreshes_started()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, ApiError> {
        let mut builder = self.http.request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, bearer(token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(retried = request.retried, authorized = token.is_some(), "dispatching request");

        match tokio::time::timeout(self.request_timeout, self.http.send(builder)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ApiError::Timeout(self.request_timeout)),
        }
    }
}

/// Read the body and map non-success statuses to [`ApiError::Http`].
///
/// An empty body decodes as JSON `null`, so `()` and `Option<T>` work for
/// 204 responses.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|err| AjokError::from(InfraError::from(err)))?;

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    if !status.is_success() {
        debug!(status = status.as_u16(), "request failed");
        return Err(ApiError::Http { status: status.as_u16(), body });
    }

    serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    config: ApiConfig,
    store: Option<Arc<dyn TokenStore>>,
    listener: Option<Arc<dyn SessionListener>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self { config: ApiConfig::default(), store: None, listener: None, refresher: None }
    }
}

impl ApiClientBuilder {
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Token persistence; defaults to an in-memory store
    pub fn store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Receiver of logout notifications
    pub fn listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Override the refresh call; defaults to `POST /users/token/refresh/`
    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// # Errors
    /// Returns `ApiError::Config` for an invalid base URL or if the HTTP
    /// client cannot be created
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let base_url = self.config.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL '{base_url}': {e}")))?;

        let user_agent = self
            .config
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("ajok/{}", env!("CARGO_PKG_VERSION")));

        let http = HttpClient::builder()
            .timeout(self.config.request_timeout() + TRANSPORT_TIMEOUT_SLACK)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        let store = self.store.unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let listener = self.listener.unwrap_or_else(|| Arc::new(NoopSessionListener));
        let refresher = self
            .refresher
            .unwrap_or_else(|| Arc::new(HttpTokenRefresher::new(http.clone(), &base_url)));

        let coordinator = RefreshCoordinator::new(
            Arc::clone(&store),
            refresher,
            listener,
            self.config.refresh_timeout(),
        );

        debug!(base_url = %base_url, "API client configured");

        Ok(ApiClient {
            http,
            base_url: base_url.into(),
            request_timeout: self.config.request_timeout(),
            store,
            coordinator,
        })
    }
}
