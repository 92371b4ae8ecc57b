//! [`TokenStore`] backends

mod file;
mod keychain;
mod memory;

use std::sync::Arc;

use ajok_core::TokenStore;
use ajok_domain::{SessionConfig, TokenStoreBackend};
use tracing::debug;

pub use file::FileTokenStore;
pub use keychain::KeychainTokenStore;
pub use memory::MemoryTokenStore;

/// Build the store selected by `session.token_store`.
pub fn from_config(config: &SessionConfig) -> Arc<dyn TokenStore> {
    debug!(backend = %config.token_store, "selecting token store");
    match config.token_store {
        TokenStoreBackend::Memory => Arc::new(MemoryTokenStore::new()),
        TokenStoreBackend::File => Arc::new(FileTokenStore::new(&config.token_path)),
        TokenStoreBackend::Keychain => Arc::new(KeychainTokenStore::new(&config.keychain_service)),
    }
}
