use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::user_dto::{UpdateUserRequest, UserResponse};
use crate::model::user::{User, UserRole};
use crate::repository::user_repo::UserRepository;
use crate::util::error::{parse_object_id, ServiceError};

#[async_trait]
pub trait UserService: Send + Sync {
    /// Load an account by id; used by the auth guard as well as the profile routes.
    async fn find(&self, id: &ObjectId) -> Result<Option<User>, ServiceError>;
    async fn public_profile(&self, id: &str) -> Result<UserResponse, ServiceError>;
    async fn update_profile(&self, id: &ObjectId, req: UpdateUserRequest) -> Result<UserResponse, ServiceError>;
    async fn delete_account(&self, id: &ObjectId) -> Result<(), ServiceError>;
    async fn change_role(&self, id: &str, role: UserRole) -> Result<UserResponse, ServiceError>;
}

pub struct UserServiceImpl {
    user_repo: Arc<dyn UserRepository>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        UserServiceImpl { user_repo }
    }
}

fn user_not_found() -> ServiceError {
    ServiceError::NotFound("User not found".to_string())
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn find(&self, id: &ObjectId) -> Result<Option<User>, ServiceError> {
        Ok(self.user_repo.find_by_id(id).await?)
    }

    async fn public_profile(&self, id: &str) -> Result<UserResponse, ServiceError> {
        let id = parse_object_id(id, "user")?;
        let user = self.user_repo.find_by_id(&id).await?.ok_or_else(user_not_found)?;
        Ok(user.into())
    }

    #[instrument(skip(self, req))]
    async fn update_profile(&self, id: &ObjectId, req: UpdateUserRequest) -> Result<UserResponse, ServiceError> {
        if req.is_empty() {
            return Err(ServiceError::InvalidInput("No fields to update".to_string()));
        }
        let user = self.user_repo.update_profile(id, req.into()).await?;
        info!("Profile updated");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, id: &ObjectId) -> Result<(), ServiceError> {
        self.user_repo.delete(id).await?;
        info!("Account deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn change_role(&self, id: &str, role: UserRole) -> Result<UserResponse, ServiceError> {
        let id = parse_object_id(id, "user")?;
        self.user_repo.find_by_id(&id).await?.ok_or_else(user_not_found)?;
        let user = self.user_repo.set_role(&id, role).await?;
        info!("Role changed to {}", role);
        Ok(user.into())
    }
}
