//! Saved listings (`/properties/favorites/`)

use ajok_domain::constants::{FAVORITES_PATH, RECOMMENDED_FAVORITES_PATH};
use ajok_domain::{find_favorite, Favorite, Listing, NewFavorite};
use tracing::{debug, instrument};

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::ListResponse;

/// Result of [`FavoritesApi::toggle`]
#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteToggle {
    Added(Favorite),
    Removed { favorite_id: i64 },
}

#[derive(Clone)]
pub struct FavoritesApi {
    client: ApiClient,
}

impl FavoritesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Favorite>, ApiError> {
        self.client.get::<ListResponse<Favorite>>(FAVORITES_PATH).await.map(ListResponse::into_vec)
    }

    pub async fn add(&self, listing_id: i64) -> Result<Favorite, ApiError> {
        self.client.post(FAVORITES_PATH, &NewFavorite { house_id: listing_id }).await
    }

    /// Remove by favorite id (not listing id)
    pub async fn remove(&self, favorite_id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("{FAVORITES_PATH}{favorite_id}/")).await
    }

    pub async fn recommended(&self) -> Result<Vec<Listing>, ApiError> {
        self.client
            .get::<ListResponse<Listing>>(RECOMMENDED_FAVORITES_PATH)
            .await
            .map(ListResponse::into_vec)
    }

    /// Save the listing if it is not saved yet, otherwise unsave it.
    #[instrument(skip(self))]
    pub async fn toggle(&self, listing_id: i64) -> Result<FavoriteToggle, ApiError> {
        let favorites = self.list().await?;
        match find_favorite(&favorites, listing_id) {
            Some(existing) => {
                let favorite_id = existing.id;
                debug!(favorite_id, "listing already saved; removing");
                self.remove(favorite_id).await?;
                Ok(FavoriteToggle::Removed { favorite_id })
            }
            None => self.add(listing_id).await.map(FavoriteToggle::Added),
        }
    }
}
