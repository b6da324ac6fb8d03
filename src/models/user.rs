use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub display_name: String,
    /// Revealed to other users only through an accepted contact request.
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
    pub allow_whatsapp: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public projection of a user. Never includes the phone number.
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            is_verified: self.is_verified,
            allow_whatsapp: self.allow_whatsapp,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
    pub allow_whatsapp: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserInsert {
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub allow_whatsapp: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}
