use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub store_name: String,
    pub brand_name: String,
    #[serde(default)]
    pub description: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    /// `false` until a system admin approves the listing.
    #[serde(default)]
    pub is_available: bool,
    pub owner: ObjectId,
    /// Public path under `/uploads`.
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Restaurant {
    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        &self.owner == user_id
    }
}
