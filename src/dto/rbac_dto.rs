use crate::model::permission::Permission;
use crate::model::role::Role;
use crate::dto::user_dto::UserResponse;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    #[validate(length(min = 2, max = 64))]
    pub name: String,
    #[serde(default)]
    pub permission_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[validate(length(min = 2, max = 64))]
    pub name: Option<String>,
    pub permission_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePermissionRequest {
    #[validate(length(min = 2, max = 64))]
    pub name: String,
    #[validate(length(max = 256))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub role_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
}

impl From<Permission> for PermissionResponse {
    fn from(p: Permission) -> Self {
        PermissionResponse {
            id: p.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: p.name,
            description: p.description,
            created_at: p.created_at,
        }
    }
}

/// Role with its permissions resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub permissions: Vec<PermissionResponse>,
    pub created_at: Option<String>,
}

impl RoleResponse {
    pub fn new(role: Role, permissions: Vec<Permission>) -> Self {
        RoleResponse {
            id: role.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: role.name,
            permissions: permissions.into_iter().map(PermissionResponse::from).collect(),
            created_at: role.created_at,
        }
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p.name == name)
    }
}

/// User together with resolved RBAC roles, as returned by `/auth/me` and the admin user list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithRoles {
    pub user: UserResponse,
    pub roles: Vec<RoleResponse>,
}
