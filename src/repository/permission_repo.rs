use crate::model::permission::Permission;
use crate::repository::repository_error::{now_rfc3339, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn create(&self, permission: Permission) -> RepositoryResult<Permission>;
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Permission>>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Permission>>;
    async fn list(&self) -> RepositoryResult<Vec<Permission>>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
}

pub struct MongoPermissionRepository {
    collection: Collection<Permission>,
}

impl MongoPermissionRepository {
    pub async fn new(db: &Database) -> RepositoryResult<Self> {
        let collection = db.collection::<Permission>("permissions");
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection
            .create_index(index, None)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to create permissions.name index", e))?;
        Ok(MongoPermissionRepository { collection })
    }

    async fn collect(&self, filter: Option<Document>) -> RepositoryResult<Vec<Permission>> {
        let cursor = self
            .collection
            .find(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list permissions: {}", e)))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to read permissions: {}", e)))
    }
}

#[async_trait]
impl PermissionRepository for MongoPermissionRepository {
    #[tracing::instrument(skip(self, permission), fields(name = %permission.name))]
    async fn create(&self, mut permission: Permission) -> RepositoryResult<Permission> {
        permission.id = Some(ObjectId::new());
        permission.created_at = Some(now_rfc3339());
        self.collection
            .insert_one(&permission, None)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to create permission", e))?;
        Ok(permission)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Permission>> {
        self.collection
            .find_one(doc! { "name": name }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch permission: {}", e)))
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Permission>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.collect(Some(doc! { "_id": { "$in": ids.to_vec() } })).await
    }

    async fn list(&self) -> RepositoryResult<Vec<Permission>> {
        self.collect(None).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete permission: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found("Permission not found"));
        }
        Ok(())
    }
}
