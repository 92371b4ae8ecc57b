use std::sync::Arc;

use ajok_core::TokenStore;
use ajok_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use ajok_domain::ApiConfig;
use ajok_infra::{ApiClient, MemoryTokenStore, SessionSignal, SessionState};
use wiremock::MockServer;

/// API client wired to a mock backend, with handles on its store and
/// session signal.
pub struct Harness {
    pub client: ApiClient,
    pub store: Arc<MemoryTokenStore>,
    pub signal: Arc<SessionSignal>,
}

impl Harness {
    pub async fn new(server: &MockServer, access: Option<&str>, refresh: Option<&str>) -> Self {
        Self::with_config(
            ApiConfig { base_url: server.uri(), ..ApiConfig::default() },
            access,
            refresh,
        )
        .await
    }

    pub async fn with_config(config: ApiConfig, access: Option<&str>, refresh: Option<&str>) -> Self {
        let store = Arc::new(MemoryTokenStore::new());
        if let Some(access) = access {
            store.set(ACCESS_TOKEN_KEY, access).await.expect("seed access token");
        }
        if let Some(refresh) = refresh {
            store.set(REFRESH_TOKEN_KEY, refresh).await.expect("seed refresh token");
        }

        let initial = if access.is_some() { SessionState::Active } else { SessionState::Anonymous };
        let signal = Arc::new(SessionSignal::new(initial));

        let client = ApiClient::builder()
            .config(config)
            .store(store.clone())
            .listener(signal.clone())
            .build()
            .expect("client should build");

        Self { client, store, signal }
    }

    pub async fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY).await.expect("store read")
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY).await.expect("store read")
    }

    pub async fn store_is_empty(&self) -> bool {
        self.store.snapshot().await.is_empty()
    }
}
