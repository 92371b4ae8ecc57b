use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ajok_core::TokenStore;
use ajok_domain::{AjokError, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::InfraError;

/// Tokens kept as one JSON object on disk.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash never leaves a half-written file. Read-modify-write cycles are
/// serialized within the process.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                AjokError::Storage(format!("token file {} is corrupt: {err}", self.path.display()))
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    async fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if values.is_empty() {
            return match fs::remove_file(&self.path).await {
                Err(err) if err.kind() != ErrorKind::NotFound => Err(InfraError::from(err).into()),
                _ => Ok(()),
            };
        }

        let data = serde_json::to_vec_pretty(values).map_err(InfraError::from)?;
        let temp_path = self.path.with_extension("tmp");

        if let Some(parent) = temp_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(InfraError::from)?;
        }

        let mut file = open_private(&temp_path).await.map_err(InfraError::from)?;
        file.write_all(&data).await.map_err(InfraError::from)?;
        file.sync_all().await.map_err(InfraError::from)?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(InfraError::from)?;
        debug!(path = %self.path.display(), keys = values.len(), "token file written");
        Ok(())
    }
}

#[cfg(unix)]
async fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path).await
}

#[cfg(not(unix))]
async fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create(true).truncate(true).open(path).await
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.read_all().await?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&values).await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn values_survive_a_new_store_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        FileTokenStore::new(&path).set("token", "a1").await.unwrap();
        FileTokenStore::new(&path).set("refreshToken", "r1").await.unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get("token").await.unwrap().as_deref(), Some("a1"));
        assert_eq!(reopened.get("refreshToken").await.unwrap().as_deref(), Some("r1"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn removing_the_last_key_deletes_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileTokenStore::new(&path);

        store.set("token", "a1").await.unwrap();
        assert!(path.exists());

        store.remove("token").await.unwrap();
        store.remove("token").await.unwrap();
        assert!(!path.exists());
        assert_eq!(store.get("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileTokenStore::new(&path).get("token").await.unwrap_err();
        assert!(matches!(err, AjokError::Storage(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        FileTokenStore::new(&path).set("token", "a1").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
