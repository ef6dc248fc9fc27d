use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Named bundle of permissions assignable to users (RBAC).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<ObjectId>,
    pub created_at: Option<String>,
}
