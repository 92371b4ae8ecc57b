//! # Ajok Core
//!
//! Session logic independent of any transport or storage backend.
//!
//! This crate contains:
//! - Port interfaces (traits) for token storage, token refresh, and logout
//!   notification
//! - Credential helpers over the token store
//! - The single-flight refresh coordinator shared by all requests of a client
//!
//! ## Architecture Principles
//! - Only depends on `ajok-domain`
//! - No HTTP, filesystem, or keychain code
//! - All external dependencies via traits

pub mod session;

pub use session::{
    LogoutReason, NoopSessionListener, RefreshCoordinator, RefreshError, RefreshPhase,
    SessionListener, TokenRefresher, TokenStore,
};
