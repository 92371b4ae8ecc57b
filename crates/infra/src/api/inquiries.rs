//! Tenant inquiries and agent replies (`/properties/inquiries/`)

use ajok_domain::constants::INQUIRIES_PATH;
use ajok_domain::{Inquiry, InquiryReply, InquiryUpdate, NewInquiry};

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::ListResponse;

fn inquiry_path(id: i64) -> String {
    format!("{INQUIRIES_PATH}{id}/")
}

#[derive(Clone)]
pub struct InquiriesApi {
    client: ApiClient,
}

impl InquiriesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Inquiries visible to the signed-in user: their own as a tenant, those
    /// on their listings as an agent.
    pub async fn list(&self) -> Result<Vec<Inquiry>, ApiError> {
        self.client.get::<ListResponse<Inquiry>>(INQUIRIES_PATH).await.map(ListResponse::into_vec)
    }

    pub async fn create(&self, listing_id: i64, message: &str) -> Result<Inquiry, ApiError> {
        let body = NewInquiry { house_id: listing_id, message: message.to_string() };
        self.client.post(INQUIRIES_PATH, &body).await
    }

    pub async fn update(&self, id: i64, message: &str) -> Result<Inquiry, ApiError> {
        self.client.put(&inquiry_path(id), &InquiryUpdate { message: message.to_string() }).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&inquiry_path(id)).await
    }

    /// Agent reply to an inquiry
    pub async fn respond(&self, id: i64, response: &str) -> Result<Inquiry, ApiError> {
        let body = InquiryReply { response: response.to_string() };
        self.client.post(&format!("{}respond/", inquiry_path(id)), &body).await
    }
}
