//! Tenant inquiries about listings (`/properties/inquiries/`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::listing::Listing;

/// The listing an inquiry refers to: a bare id or the embedded listing,
/// depending on the serializer in use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingRef {
    Id(i64),
    Listing(Box<Listing>),
}

impl ListingRef {
    pub fn id(&self) -> i64 {
        match self {
            ListingRef::Id(id) => *id,
            ListingRef::Listing(listing) => listing.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: i64,
    pub house: ListingRef,
    pub message: String,
    /// Agent's reply, once given
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Inquiry {
    pub fn is_answered(&self) -> bool {
        self.response.as_deref().is_some_and(|r| !r.trim().is_empty())
    }
}

/// Body of `POST /properties/inquiries/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInquiry {
    pub house_id: i64,
    pub message: String,
}

/// Body of `PUT /properties/inquiries/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryUpdate {
    pub message: String,
}

/// Body of `POST /properties/inquiries/{id}/respond/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryReply {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn house_accepts_plain_id() {
        let inquiry: Inquiry = serde_json::from_str(
            r#"{"id":3,"house":12,"message":"Is it still available?","response":null}"#,
        )
        .unwrap();
        assert_eq!(inquiry.house.id(), 12);
        assert!(!inquiry.is_answered());
    }

    #[test]
    fn house_accepts_embedded_listing() {
        let inquiry: Inquiry = serde_json::from_str(
            r#"{"id":4,"message":"Viewing on Saturday?","response":"Yes, 10am",
                "house":{"id":9,"title":"Cottage","price":"400.00","property_status":"for_rent"}}"#,
        )
        .unwrap();
        assert_eq!(inquiry.house.id(), 9);
        assert!(inquiry.is_answered());
    }
}
