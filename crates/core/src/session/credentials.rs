//! Credential helpers over a [`TokenStore`]

use ajok_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use ajok_domain::{Credentials, Result};

use super::ports::TokenStore;

/// Current access token, if any.
pub async fn access_token(store: &dyn TokenStore) -> Result<Option<String>> {
    store.get(ACCESS_TOKEN_KEY).await
}

/// Current refresh token, if any.
pub async fn refresh_token(store: &dyn TokenStore) -> Result<Option<String>> {
    store.get(REFRESH_TOKEN_KEY).await
}

pub async fn load_credentials(store: &dyn TokenStore) -> Result<Credentials> {
    Ok(Credentials {
        access_token: store.get(ACCESS_TOKEN_KEY).await?,
        refresh_token: store.get(REFRESH_TOKEN_KEY).await?,
    })
}

/// Persist both halves; a `None` half removes the stored value.
pub async fn save_credentials(store: &dyn TokenStore, credentials: &Credentials) -> Result<()> {
    put_or_remove(store, ACCESS_TOKEN_KEY, credentials.access_token.as_deref()).await?;
    put_or_remove(store, REFRESH_TOKEN_KEY, credentials.refresh_token.as_deref()).await
}

pub async fn clear_credentials(store: &dyn TokenStore) -> Result<()> {
    store.remove(ACCESS_TOKEN_KEY).await?;
    store.remove(REFRESH_TOKEN_KEY).await
}

async fn put_or_remove(store: &dyn TokenStore, key: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) => store.set(key, value).await,
        None => store.remove(key).await,
    }
}
