use async_trait::async_trait;
use bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::admin_user_conf::AdminUserConfig;
use crate::dto::rbac_dto::{
    CreatePermissionRequest, CreateRoleRequest, PermissionResponse, RoleResponse, UpdateRoleRequest, UserWithRoles,
};
use crate::model::permission::Permission;
use crate::model::role::Role;
use crate::model::user::{User, UserRole};
use crate::repository::permission_repo::PermissionRepository;
use crate::repository::role_repo::RoleRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::{parse_object_id, ServiceError};
use crate::util::password::hash_password;

/// Permissions every deployment starts with; the admin user routes check them.
pub const VIEW_USERS: &str = "viewUsers";
pub const DELETE_USER: &str = "deleteUser";

#[async_trait]
pub trait RbacService: Send + Sync {
    async fn create_role(&self, req: CreateRoleRequest) -> Result<RoleResponse, ServiceError>;
    async fn list_roles(&self) -> Result<Vec<RoleResponse>, ServiceError>;
    async fn update_role(&self, id: &str, req: UpdateRoleRequest) -> Result<RoleResponse, ServiceError>;
    async fn delete_role(&self, id: &str) -> Result<(), ServiceError>;
    async fn create_permission(&self, req: CreatePermissionRequest) -> Result<PermissionResponse, ServiceError>;
    async fn list_permissions(&self) -> Result<Vec<PermissionResponse>, ServiceError>;
    async fn delete_permission(&self, id: &str) -> Result<(), ServiceError>;
    async fn assign_role(&self, user_id: &str, role_id: &str) -> Result<UserWithRoles, ServiceError>;
    async fn remove_role(&self, user_id: &str, role_id: &str) -> Result<UserWithRoles, ServiceError>;
    async fn list_users(&self) -> Result<Vec<UserWithRoles>, ServiceError>;
    async fn delete_user(&self, user_id: &str) -> Result<(), ServiceError>;
    /// RBAC roles of a user with their permissions resolved.
    async fn roles_of(&self, user: &User) -> Result<Vec<RoleResponse>, ServiceError>;
    /// Create the configured system admin, the base permissions and the super admin role if missing.
    async fn bootstrap(&self, admin: &AdminUserConfig) -> Result<(), ServiceError>;
}

pub struct RbacServiceImpl {
    user_repo: Arc<dyn UserRepository>,
    role_repo: Arc<dyn RoleRepository>,
    permission_repo: Arc<dyn PermissionRepository>,
}

impl RbacServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        role_repo: Arc<dyn RoleRepository>,
        permission_repo: Arc<dyn PermissionRepository>,
    ) -> Self {
        RbacServiceImpl { user_repo, role_repo, permission_repo }
    }

    /// Parse the ids and make sure every one names an existing permission.
    async fn checked_permissions(&self, raw: &[String]) -> Result<Vec<ObjectId>, ServiceError> {
        let mut ids = Vec::with_capacity(raw.len());
        for r in raw {
            let id = ObjectId::parse_str(r.trim()).map_err(|_| ServiceError::InvalidInput("Invalid permissions".into()))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        let found = self.permission_repo.find_by_ids(&ids).await?;
        if found.len() != ids.len() {
            return Err(ServiceError::InvalidInput("Invalid permissions".to_string()));
        }
        Ok(ids)
    }

    async fn resolve(&self, roles: Vec<Role>) -> Result<Vec<RoleResponse>, ServiceError> {
        let mut wanted: Vec<ObjectId> = roles.iter().flat_map(|r| r.permissions.iter().copied()).collect();
        wanted.sort();
        wanted.dedup();
        let by_id: HashMap<ObjectId, Permission> = self
            .permission_repo
            .find_by_ids(&wanted)
            .await?
            .into_iter()
            .filter_map(|p| p.id.map(|id| (id, p)))
            .collect();

        Ok(roles
            .into_iter()
            .map(|role| {
                let perms = role.permissions.iter().filter_map(|id| by_id.get(id).cloned()).collect();
                RoleResponse::new(role, perms)
            })
            .collect())
    }

    async fn with_roles(&self, user: User) -> Result<UserWithRoles, ServiceError> {
        let roles = self.roles_of(&user).await?;
        Ok(UserWithRoles { user: user.into(), roles })
    }

    async fn existing_user(&self, raw: &str) -> Result<ObjectId, ServiceError> {
        let id = parse_object_id(raw, "user")?;
        self.user_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        Ok(id)
    }

    async fn ensure_permission(&self, name: &str, description: &str) -> Result<ObjectId, ServiceError> {
        if let Some(existing) = self.permission_repo.find_by_name(name).await? {
            return existing.id.ok_or_else(|| ServiceError::InternalError("Stored permission has no id".into()));
        }
        let created = self
            .permission_repo
            .create(Permission { id: None, name: name.to_string(), description: Some(description.to_string()), created_at: None })
            .await?;
        info!("Seeded permission {}", name);
        created.id.ok_or_else(|| ServiceError::InternalError("Created permission has no id".into()))
    }
}

#[async_trait]
impl RbacService for RbacServiceImpl {
    #[instrument(skip(self, req), fields(name = %req.name))]
    async fn create_role(&self, req: CreateRoleRequest) -> Result<RoleResponse, ServiceError> {
        if self.role_repo.find_by_name(&req.name).await?.is_some() {
            return Err(ServiceError::Conflict("Role already exists".to_string()));
        }
        let permissions = self.checked_permissions(&req.permission_ids).await?;
        let role = self
            .role_repo
            .create(Role { id: None, name: req.name, permissions, created_at: None })
            .await?;
        info!("Role created");
        let mut resolved = self.resolve(vec![role]).await?;
        resolved.pop().ok_or_else(|| ServiceError::InternalError("Role vanished".into()))
    }

    async fn list_roles(&self) -> Result<Vec<RoleResponse>, ServiceError> {
        let roles = self.role_repo.list().await?;
        self.resolve(roles).await
    }

    #[instrument(skip(self, req))]
    async fn update_role(&self, id: &str, req: UpdateRoleRequest) -> Result<RoleResponse, ServiceError> {
        let id = parse_object_id(id, "role")?;
        if req.name.is_none() && req.permission_ids.is_none() {
            return Err(ServiceError::InvalidInput("Provide a name or permissionIds to update".to_string()));
        }
        if let Some(name) = &req.name {
            if let Some(other) = self.role_repo.find_by_name(name).await? {
                if other.id != Some(id) {
                    return Err(ServiceError::Conflict("Role already exists".to_string()));
                }
            }
        }
        let permissions = match &req.permission_ids {
            Some(raw) => Some(self.checked_permissions(raw).await?),
            None => None,
        };
        let role = self.role_repo.update(&id, req.name, permissions).await?;
        let mut resolved = self.resolve(vec![role]).await?;
        resolved.pop().ok_or_else(|| ServiceError::InternalError("Role vanished".into()))
    }

    #[instrument(skip(self))]
    async fn delete_role(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_object_id(id, "role")?;
        self.role_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Role not found".to_string()))?;
        let pulled = self.user_repo.pull_role_from_all(&id).await?;
        self.role_repo.delete(&id).await?;
        info!("Role deleted, detached from {} users", pulled);
        Ok(())
    }

    #[instrument(skip(self, req), fields(name = %req.name))]
    async fn create_permission(&self, req: CreatePermissionRequest) -> Result<PermissionResponse, ServiceError> {
        if self.permission_repo.find_by_name(&req.name).await?.is_some() {
            return Err(ServiceError::Conflict("Permission already exists".to_string()));
        }
        let permission = self
            .permission_repo
            .create(Permission { id: None, name: req.name, description: req.description, created_at: None })
            .await?;
        Ok(permission.into())
    }

    async fn list_permissions(&self) -> Result<Vec<PermissionResponse>, ServiceError> {
        Ok(self.permission_repo.list().await?.into_iter().map(PermissionResponse::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete_permission(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_object_id(id, "permission")?;
        self.permission_repo.delete(&id).await?;
        let pulled = self.role_repo.pull_permission_from_all(&id).await?;
        info!("Permission deleted, detached from {} roles", pulled);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn assign_role(&self, user_id: &str, role_id: &str) -> Result<UserWithRoles, ServiceError> {
        let user_id = self.existing_user(user_id).await?;
        let role_id = parse_object_id(role_id, "role")?;
        self.role_repo
            .find_by_id(&role_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Role not found".to_string()))?;
        let user = self.user_repo.add_role(&user_id, &role_id).await?;
        self.with_roles(user).await
    }

    #[instrument(skip(self))]
    async fn remove_role(&self, user_id: &str, role_id: &str) -> Result<UserWithRoles, ServiceError> {
        let user_id = self.existing_user(user_id).await?;
        let role_id = parse_object_id(role_id, "role")?;
        let user = self.user_repo.remove_role(&user_id, &role_id).await?;
        self.with_roles(user).await
    }

    async fn list_users(&self) -> Result<Vec<UserWithRoles>, ServiceError> {
        let users = self.user_repo.find_all().await?;
        let mut out = Vec::with_capacity(users.len());
        for user in users {
            out.push(self.with_roles(user).await?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: &str) -> Result<(), ServiceError> {
        let id = self.existing_user(user_id).await?;
        self.user_repo.delete(&id).await?;
        info!("User deleted by admin");
        Ok(())
    }

    async fn roles_of(&self, user: &User) -> Result<Vec<RoleResponse>, ServiceError> {
        if user.roles.is_empty() {
            return Ok(Vec::new());
        }
        let roles = self.role_repo.find_by_ids(&user.roles).await?;
        self.resolve(roles).await
    }

    #[instrument(skip(self, admin), fields(email = %admin.email))]
    async fn bootstrap(&self, admin: &AdminUserConfig) -> Result<(), ServiceError> {
        let view = self.ensure_permission(VIEW_USERS, "List every user").await?;
        let delete = self.ensure_permission(DELETE_USER, "Delete any user").await?;

        let role = match self.role_repo.find_by_name(&admin.super_admin_role).await? {
            Some(role) => {
                let mut perms = role.permissions.clone();
                let missing: Vec<ObjectId> = [view, delete].into_iter().filter(|p| !perms.contains(p)).collect();
                if missing.is_empty() {
                    role
                } else {
                    perms.extend(missing);
                    let id = role.id.ok_or_else(|| ServiceError::InternalError("Stored role has no id".into()))?;
                    self.role_repo.update(&id, None, Some(perms)).await?
                }
            }
            None => {
                info!("Creating RBAC role {}", admin.super_admin_role);
                self.role_repo
                    .create(Role {
                        id: None,
                        name: admin.super_admin_role.clone(),
                        permissions: vec![view, delete],
                        created_at: None,
                    })
                    .await?
            }
        };
        let role_id = role.id.ok_or_else(|| ServiceError::InternalError("Stored role has no id".into()))?;

        let user = match self.user_repo.find_by_email(&admin.email).await? {
            Some(user) => {
                if user.role != UserRole::SystemAdmin {
                    warn!("Bootstrap admin {} did not have the system_admin role; fixing", admin.email);
                }
                user
            }
            None => {
                let mut user = User::new(&admin.email);
                user.first_name = admin.first_name.clone();
                user.last_name = admin.last_name.clone();
                user.password_hash = Some(hash_password(&admin.password)?);
                user.is_verified = true;
                user.role = UserRole::SystemAdmin;
                let created = self.user_repo.insert(user).await?;
                info!("Created bootstrap system admin");
                created
            }
        };
        let user_id = user.id.ok_or_else(|| ServiceError::InternalError("Stored user has no id".into()))?;
        if user.role != UserRole::SystemAdmin {
            self.user_repo.set_role(&user_id, UserRole::SystemAdmin).await?;
        }
        if !user.roles.contains(&role_id) {
            self.user_repo.add_role(&user_id, &role_id).await?;
        }
        Ok(())
    }
}
