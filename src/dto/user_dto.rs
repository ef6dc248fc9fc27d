use crate::model::user::{User, UserRole};
use crate::repository::user_repo::ProfileUpdate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub is_verified: bool,
    pub roles: Vec<String>,
    pub provider: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id_hex(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            address: user.address,
            role: user.role,
            is_verified: user.is_verified,
            roles: user.roles.iter().map(|r| r.to_hex()).collect(),
            provider: user.provider,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub last_name: Option<String>,
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 256))]
    pub address: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

impl From<UpdateUserRequest> for ProfileUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        ProfileUpdate {
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            address: req.address,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}
