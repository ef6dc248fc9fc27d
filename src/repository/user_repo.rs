use crate::model::cart::CartItem;
use crate::model::user::{User, UserRole};
use crate::repository::repository_error::{now_rfc3339, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use tracing::{debug, error, info};

/// Self-service profile fields. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_all(&self) -> RepositoryResult<Vec<User>>;
    async fn update_profile(&self, id: &ObjectId, update: ProfileUpdate) -> RepositoryResult<User>;
    async fn set_role(&self, id: &ObjectId, role: UserRole) -> RepositoryResult<User>;
    async fn mark_verified(&self, email: &str) -> RepositoryResult<User>;
    /// Record the provider identity and mark the account verified.
    async fn link_social(&self, id: &ObjectId, provider: &str, social_id: &str) -> RepositoryResult<User>;
    /// Replace the whole embedded cart array.
    async fn replace_cart(&self, id: &ObjectId, cart: Vec<CartItem>) -> RepositoryResult<User>;
    async fn add_role(&self, id: &ObjectId, role_id: &ObjectId) -> RepositoryResult<User>;
    async fn remove_role(&self, id: &ObjectId, role_id: &ObjectId) -> RepositoryResult<User>;
    /// Remove a role reference from every user holding it.
    async fn pull_role_from_all(&self, role_id: &ObjectId) -> RepositoryResult<u64>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub async fn new(db: &Database) -> RepositoryResult<Self> {
        let collection = db.collection::<User>("users");
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection
            .create_index(index, None)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to create users.email index", e))?;
        Ok(MongoUserRepository { collection })
    }

    async fn update_returning(&self, id: &ObjectId, set: Document, extra: Option<Document>) -> RepositoryResult<User> {
        let mut set = set;
        set.insert("updatedAt", now_rfc3339());
        let mut update = doc! { "$set": set };
        if let Some(extra) = extra {
            update.extend(extra);
        }
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await
            .map_err(|e| {
                error!("Failed to update user {}: {}", id, e);
                RepositoryError::from_mongo("Failed to update user", e)
            })?;
        updated.ok_or_else(|| RepositoryError::not_found(format!("User not found for ID: {}", id)))
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = now_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        self.collection
            .insert_one(&user, None)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to insert user", e))?;
        info!("User inserted");
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by id: {}", e)))
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.trim().to_lowercase();
        self.collection
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by email: {}", e)))
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        let cursor = self
            .collection
            .find(None, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list users: {}", e)))?;
        let users: Vec<User> = cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to read users: {}", e)))?;
        debug!("Fetched {} users", users.len());
        Ok(users)
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_profile(&self, id: &ObjectId, update: ProfileUpdate) -> RepositoryResult<User> {
        let mut set = Document::new();
        if let Some(v) = update.first_name {
            set.insert("firstName", v);
        }
        if let Some(v) = update.last_name {
            set.insert("lastName", v);
        }
        if let Some(v) = update.phone {
            set.insert("phone", v);
        }
        if let Some(v) = update.address {
            set.insert("address", v);
        }
        self.update_returning(id, set, None).await
    }

    #[tracing::instrument(skip(self))]
    async fn set_role(&self, id: &ObjectId, role: UserRole) -> RepositoryResult<User> {
        self.update_returning(id, doc! { "role": role.as_str() }, None).await
    }

    #[tracing::instrument(skip(self))]
    async fn mark_verified(&self, email: &str) -> RepositoryResult<User> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| RepositoryError::not_found("User not found"))?;
        let id = user.id.ok_or_else(|| RepositoryError::validation("Stored user has no id"))?;
        self.update_returning(&id, doc! { "isVerified": true }, None).await
    }

    #[tracing::instrument(skip(self))]
    async fn link_social(&self, id: &ObjectId, provider: &str, social_id: &str) -> RepositoryResult<User> {
        self.update_returning(
            id,
            doc! { "provider": provider, "socialId": social_id, "isVerified": true },
            None,
        )
        .await
    }

    #[tracing::instrument(skip(self, cart), fields(lines = cart.len()))]
    async fn replace_cart(&self, id: &ObjectId, cart: Vec<CartItem>) -> RepositoryResult<User> {
        let lines = bson::to_bson(&cart)?;
        self.update_returning(id, doc! { "cart": lines }, None).await
    }

    #[tracing::instrument(skip(self))]
    async fn add_role(&self, id: &ObjectId, role_id: &ObjectId) -> RepositoryResult<User> {
        self.update_returning(id, Document::new(), Some(doc! { "$addToSet": { "roles": role_id } }))
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn remove_role(&self, id: &ObjectId, role_id: &ObjectId) -> RepositoryResult<User> {
        self.update_returning(id, Document::new(), Some(doc! { "$pull": { "roles": role_id } }))
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn pull_role_from_all(&self, role_id: &ObjectId) -> RepositoryResult<u64> {
        let result = self
            .collection
            .update_many(doc! { "roles": role_id }, doc! { "$pull": { "roles": role_id } }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to pull role from users: {}", e)))?;
        info!("Removed role {} from {} users", role_id, result.modified_count);
        Ok(result.modified_count)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete user: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("User not found for ID: {}", id)));
        }
        Ok(())
    }
}
