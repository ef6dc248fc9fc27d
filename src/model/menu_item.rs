use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    pub restaurant: ObjectId,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
