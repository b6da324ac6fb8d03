use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    /// Set when an escrow transaction completes or the owner marks the item
    /// sold manually.
    Sold,
    /// Soft-delete target; hidden listings never show up in browse results.
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    New,
    SlightlyUsed,
    VeryUsed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Sale price in whole ZAR.
    pub price: i64,
    pub images: Vec<String>,
    pub category: String,
    pub sub_category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: Option<ItemCondition>,
    pub retail_price: Option<i64>,
    pub discount_percent: Option<i32>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingInsert {
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    pub sub_category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: Option<ItemCondition>,
    pub retail_price: Option<i64>,
    pub discount_percent: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: Option<ItemCondition>,
    pub retail_price: Option<i64>,
    pub discount_percent: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilters {
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub condition: Option<ItemCondition>,
    pub brand: Option<String>,
    pub status: Option<ListingStatus>,
    pub user_id: Option<Uuid>,
    pub search: Option<String>,
}

/// Listing detail view joined with the seller's public identity. The phone
/// number is present only when the viewer owns the listing; everyone else
/// goes through the contact gate.
#[derive(Debug, Serialize)]
pub struct ListingDetails {
    pub listing: Listing,
    pub is_owner: bool,
    pub seller_name: String,
    pub seller_verified: bool,
    pub seller_phone: Option<String>,
}
