use crate::model::role::Role;
use crate::repository::repository_error::{now_rfc3339, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use tracing::info;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create(&self, role: Role) -> RepositoryResult<Role>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Role>>;
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Role>>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Role>>;
    async fn list(&self) -> RepositoryResult<Vec<Role>>;
    async fn update(&self, id: &ObjectId, name: Option<String>, permissions: Option<Vec<ObjectId>>) -> RepositoryResult<Role>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
    /// Drop a permission reference from every role.
    async fn pull_permission_from_all(&self, permission_id: &ObjectId) -> RepositoryResult<u64>;
}

pub struct MongoRoleRepository {
    collection: Collection<Role>,
}

impl MongoRoleRepository {
    pub async fn new(db: &Database) -> RepositoryResult<Self> {
        let collection = db.collection::<Role>("roles");
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection
            .create_index(index, None)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to create roles.name index", e))?;
        Ok(MongoRoleRepository { collection })
    }

    async fn collect(&self, filter: Option<Document>) -> RepositoryResult<Vec<Role>> {
        let cursor = self
            .collection
            .find(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list roles: {}", e)))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to read roles: {}", e)))
    }
}

#[async_trait]
impl RoleRepository for MongoRoleRepository {
    #[tracing::instrument(skip(self, role), fields(name = %role.name))]
    async fn create(&self, mut role: Role) -> RepositoryResult<Role> {
        role.id = Some(ObjectId::new());
        role.created_at = Some(now_rfc3339());
        self.collection
            .insert_one(&role, None)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to create role", e))?;
        info!("Role created");
        Ok(role)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Role>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch role: {}", e)))
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Role>> {
        self.collection
            .find_one(doc! { "name": name }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch role by name: {}", e)))
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.collect(Some(doc! { "_id": { "$in": ids.to_vec() } })).await
    }

    async fn list(&self) -> RepositoryResult<Vec<Role>> {
        self.collect(None).await
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, id: &ObjectId, name: Option<String>, permissions: Option<Vec<ObjectId>>) -> RepositoryResult<Role> {
        let mut set = Document::new();
        if let Some(name) = name {
            set.insert("name", name);
        }
        if let Some(permissions) = permissions {
            set.insert("permissions", permissions);
        }
        if set.is_empty() {
            return Err(RepositoryError::validation("Nothing to update"));
        }
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to update role", e))?
            .ok_or_else(|| RepositoryError::not_found("Role not found"))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete role: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found("Role not found"));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn pull_permission_from_all(&self, permission_id: &ObjectId) -> RepositoryResult<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "permissions": permission_id },
                doc! { "$pull": { "permissions": permission_id } },
                None,
            )
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to pull permission from roles: {}", e)))?;
        Ok(result.modified_count)
    }
}
