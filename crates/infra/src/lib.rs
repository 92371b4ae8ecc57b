//! # Ajok Infrastructure
//!
//! Implementations of the `ajok-core` session ports plus the HTTP client for
//! the listings backend.
//!
//! This crate contains:
//! - The authenticated API client (bearer attachment, refresh-and-replay)
//!   and thin endpoint wrappers for auth, listings, favorites and inquiries
//! - Token store backends (memory, JSON file, platform keychain)
//! - A `watch`-based session signal for logout side effects
//! - Configuration loading from files and environment variables
//!
//! ## Architecture
//! - Implements traits defined in `ajok-core`
//! - Contains all "impure" code (network, filesystem, keychain)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod session;
pub mod store;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientBuilder, ApiError, ApiErrorCategory, AuthApi, FavoriteToggle,
    FavoritesApi, InquiriesApi, ListingsApi,
};
pub use errors::InfraError;
pub use http::HttpClient;
pub use session::{SessionSignal, SessionState};
pub use store::{FileTokenStore, KeychainTokenStore, MemoryTokenStore};
