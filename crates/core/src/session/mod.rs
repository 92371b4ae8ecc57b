//! Session ports and the token refresh coordinator

pub mod coordinator;
pub mod credentials;
pub mod ports;

pub use coordinator::{RefreshCoordinator, RefreshPhase};
pub use credentials::{
    access_token, clear_credentials, load_credentials, refresh_token, save_credentials,
};
pub use ports::{
    LogoutReason, NoopSessionListener, RefreshError, SessionListener, TokenRefresher, TokenStore,
};
