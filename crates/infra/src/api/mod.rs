//! Listings backend client
//!
//! [`ApiClient`] owns token attachment and refresh-and-replay; the endpoint
//! wrappers are thin parameter mappings over it.

pub mod auth;
pub mod client;
pub mod errors;
pub mod favorites;
pub mod inquiries;
pub mod listings;
pub mod refresher;
pub mod request;

pub use auth::AuthApi;
pub use client::{ApiClient, ApiClientBuilder};
pub use errors::{ApiError, ApiErrorCategory};
pub use favorites::{FavoriteToggle, FavoritesApi};
pub use inquiries::InquiriesApi;
pub use listings::ListingsApi;
pub use refresher::HttpTokenRefresher;
pub use request::{ApiRequest, AuthMode, ListResponse};

impl ApiClient {
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    pub fn listings(&self) -> ListingsApi {
        ListingsApi::new(self.clone())
    }

    pub fn favorites(&self) -> FavoritesApi {
        FavoritesApi::new(self.clone())
    }

    pub fn inquiries(&self) -> InquiriesApi {
        InquiriesApi::new(self.clone())
    }
}
