//! Saved listings (`/properties/favorites/`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::listing::Listing;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub house: Listing,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /properties/favorites/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFavorite {
    pub house_id: i64,
}

/// Find the favorite entry that saves `listing_id`, if any.
pub fn find_favorite(favorites: &[Favorite], listing_id: i64) -> Option<&Favorite> {
    favorites.iter().find(|fav| fav.house.id == listing_id)
}
