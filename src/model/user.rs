use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::cart::CartItem;

/// Platform role stored on every account. Drives `restrict_to` checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    RestaurantAdmin,
    SystemAdmin,
    DeliveryPersonnel,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::RestaurantAdmin => "restaurant_admin",
            UserRole::SystemAdmin => "system_admin",
            UserRole::DeliveryPersonnel => "delivery_personnel",
        }
    }

    /// Roles a visitor may pick for themselves at sign-up.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, UserRole::Customer | UserRole::DeliveryPersonnel)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(UserRole::Customer),
            "restaurant_admin" => Ok(UserRole::RestaurantAdmin),
            "system_admin" => Ok(UserRole::SystemAdmin),
            "delivery_personnel" => Ok(UserRole::DeliveryPersonnel),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub email: String,
    /// Absent for accounts created through social login.
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub is_verified: bool,
    /// RBAC role references.
    #[serde(default)]
    pub roles: Vec<ObjectId>,
    #[serde(default)]
    pub social_id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub cart: Vec<CartItem>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl User {
    pub fn new(email: &str) -> Self {
        User {
            id: None,
            email: email.trim().to_lowercase(),
            password_hash: None,
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            address: None,
            role: UserRole::Customer,
            is_verified: false,
            roles: Vec::new(),
            social_id: None,
            provider: None,
            cart: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn is_social(&self) -> bool {
        self.social_id.is_some()
    }
}
