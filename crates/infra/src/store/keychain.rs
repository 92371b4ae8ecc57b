use ajok_core::TokenStore;
use ajok_domain::{AjokError, Result};
use async_trait::async_trait;
use keyring::Entry;

use crate::errors::InfraError;

/// Platform keychain, one entry per key under a shared service name.
///
/// `keyring` calls block, so each runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct KeychainTokenStore {
    service: String,
}

impl KeychainTokenStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    async fn with_entry<T, F>(&self, key: &str, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T> + Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &key).map_err(InfraError::from)?;
            op(entry)
        })
        .await
        .map_err(|e| AjokError::Internal(format!("keychain task failed: {e}")))?
    }
}

#[async_trait]
impl TokenStore for KeychainTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_entry(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(InfraError::from(err).into()),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let value = value.to_string();
        self.with_entry(key, move |entry| {
            entry.set_password(&value).map_err(|e| InfraError::from(e).into())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        })
        .await
    }
}
