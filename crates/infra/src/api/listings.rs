//! Property listing endpoints (`/properties/listings/`, `/properties/types/`)

use ajok_domain::constants::{LISTINGS_PATH, MY_LISTINGS_PATH, PROPERTY_TYPES_PATH};
use ajok_domain::{
    ContactAgentRequest, ImageUpload, Listing, ListingDraft, ListingQuery, PropertyImage,
    PropertyType,
};
use serde::de::IgnoredAny;
use tracing::instrument;

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::ListResponse;

fn listing_path(id: i64) -> String {
    format!("{LISTINGS_PATH}{id}/")
}

#[derive(Clone)]
pub struct ListingsApi {
    client: ApiClient,
}

impl ListingsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn property_types(&self) -> Result<Vec<PropertyType>, ApiError> {
        self.client.get::<ListResponse<PropertyType>>(PROPERTY_TYPES_PATH).await.map(ListResponse::into_vec)
    }

    /// Search listings; unset filters are not sent.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ListingQuery) -> Result<Vec<Listing>, ApiError> {
        self.client
            .get_with_query::<ListResponse<Listing>, _>(LISTINGS_PATH, query)
            .await
            .map(ListResponse::into_vec)
    }

    /// Listings created by the signed-in agent
    pub async fn my_listings(&self) -> Result<Vec<Listing>, ApiError> {
        self.client.get::<ListResponse<Listing>>(MY_LISTINGS_PATH).await.map(ListResponse::into_vec)
    }

    pub async fn get(&self, id: i64) -> Result<Listing, ApiError> {
        self.client.get(&listing_path(id)).await
    }

    pub async fn create(&self, draft: &ListingDraft) -> Result<Listing, ApiError> {
        self.client.post(LISTINGS_PATH, draft).await
    }

    pub async fn update(&self, id: i64, draft: &ListingDraft) -> Result<Listing, ApiError> {
        self.client.put(&listing_path(id), draft).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&listing_path(id)).await
    }

    pub async fn upload_image(&self, id: i64, image: &ImageUpload) -> Result<PropertyImage, ApiError> {
        self.client.post(&format!("{}images/", listing_path(id)), image).await
    }

    pub async fn contact_agent(&self, id: i64, message: &str) -> Result<(), ApiError> {
        let body = ContactAgentRequest { message: message.to_string() };
        self.client
            .post::<_, IgnoredAny>(&format!("{}contact/", listing_path(id)), &body)
            .await
            .map(|_| ())
    }
}
