//! Property listing types (`/properties/listings/`, `/properties/types/`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_wire_str_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    ForSale,
    ForRent,
}

impl_wire_str_conversions!(ListingStatus {
    ForSale => "for_sale",
    ForRent => "for_rent",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyImage {
    pub id: i64,
    /// Image URL
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// A property as the backend serializes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Decimal amount, kept as the backend's string ("250000.00")
    pub price: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: Option<String>,
    pub property_status: ListingStatus,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub area: u32,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub images: Vec<PropertyImage>,
    #[serde(default)]
    pub agent: Option<Agent>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: String,
}

/// Writable listing fields for create (`POST`) and update (`PUT`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub property_status: ListingStatus,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
}

/// Search filters understood by `GET /properties/listings/`.
///
/// Unset filters are omitted from the query string. `bedrooms` and
/// `bathrooms` are minimums; `search` matches on title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// `price`, `-price`, `created_at` or `-created_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property_type(mut self, id: i64) -> Self {
        self.property_type = Some(id);
        self
    }

    pub fn price_between(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn min_bedrooms(mut self, bedrooms: u32) -> Self {
        self.bedrooms = Some(bedrooms);
        self
    }

    pub fn min_bathrooms(mut self, bathrooms: u32) -> Self {
        self.bathrooms = Some(bathrooms);
        self
    }

    /// Blank search terms are dropped rather than sent as `search=`.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let trimmed = term.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of `POST /properties/listings/{id}/images/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpload {
    pub image: String,
}

/// Body of `POST /properties/listings/{id}/contact/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactAgentRequest {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_JSON: &str = r#"{
        "id": 12,
        "title": "Two bedroom apartment",
        "description": "Close to the market",
        "price": "850.00",
        "address": "Plot 4, Ntinda",
        "location": null,
        "property_status": "for_rent",
        "bedrooms": 2,
        "bathrooms": 1,
        "area": 80,
        "property_type": {"id": 1, "name": "Apartment"},
        "features": [{"id": 3, "name": "Parking"}],
        "images": [],
        "agent": null,
        "created_by": 5,
        "created_at": "2024-05-01T10:00:00.123456Z",
        "updated_at": "2024-05-02T08:30:00+03:00",
        "status": "active"
    }"#;

    #[test]
    fn decodes_backend_listing() {
        let listing: Listing = serde_json::from_str(LISTING_JSON).unwrap();
        assert_eq!(listing.property_status, ListingStatus::ForRent);
        assert_eq!(listing.price, "850.00");
        assert_eq!(listing.property_type.as_ref().map(|t| t.name.as_str()), Some("Apartment"));
        assert_eq!(listing.features.len(), 1);
        assert!(listing.updated_at.is_some());
    }

    #[test]
    fn query_serializes_only_set_filters() {
        let query = ListingQuery::new().min_bedrooms(3).search("  villa ").ordering("-price");
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "bedrooms": 3, "search": "villa", "ordering": "-price" })
        );
    }

    #[test]
    fn blank_search_is_dropped() {
        let query = ListingQuery::new().search("   ");
        assert!(query.search.is_none());
        assert!(query.is_empty());
    }

    #[test]
    fn draft_omits_empty_relations() {
        let draft = ListingDraft {
            title: "Bungalow".into(),
            description: "Quiet street".into(),
            price: "120000.00".into(),
            address: "Muyenga".into(),
            location: None,
            property_status: ListingStatus::ForSale,
            bedrooms: 3,
            bathrooms: 2,
            area: 200,
            property_type_id: Some(2),
            feature_ids: Vec::new(),
            agent_id: None,
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["property_status"], "for_sale");
        assert_eq!(json["property_type_id"], 2);
        assert!(json.get("feature_ids").is_none());
        assert!(json.get("agent_id").is_none());
    }
}
