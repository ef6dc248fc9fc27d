use crate::model::menu_item::MenuItem;
use crate::repository::repository_error::{now_rfc3339, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};
use tracing::info;

#[async_trait]
pub trait MenuItemRepository: Send + Sync {
    async fn create(&self, item: MenuItem) -> RepositoryResult<MenuItem>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<MenuItem>>;
    async fn list_by_restaurant(&self, restaurant: &ObjectId, only_available: bool) -> RepositoryResult<Vec<MenuItem>>;
    async fn list_all(&self) -> RepositoryResult<Vec<MenuItem>>;
    async fn update(&self, id: &ObjectId, item: MenuItem) -> RepositoryResult<MenuItem>;
    async fn set_availability(&self, id: &ObjectId, is_available: bool) -> RepositoryResult<MenuItem>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
    async fn delete_by_restaurant(&self, restaurant: &ObjectId) -> RepositoryResult<u64>;
}

pub struct MongoMenuItemRepository {
    collection: Collection<MenuItem>,
}

impl MongoMenuItemRepository {
    pub fn new(db: &Database) -> Self {
        MongoMenuItemRepository {
            collection: db.collection::<MenuItem>("menuitems"),
        }
    }

    async fn collect(&self, filter: Option<bson::Document>) -> RepositoryResult<Vec<MenuItem>> {
        let cursor = self
            .collection
            .find(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list menu items: {}", e)))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to read menu items: {}", e)))
    }

    async fn set_fields(&self, id: &ObjectId, mut set: bson::Document) -> RepositoryResult<MenuItem> {
        set.insert("updatedAt", now_rfc3339());
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to update menu item", e))?
            .ok_or_else(|| RepositoryError::not_found("Menu item not found"))
    }
}

#[async_trait]
impl MenuItemRepository for MongoMenuItemRepository {
    #[tracing::instrument(skip(self, item), fields(name = %item.name))]
    async fn create(&self, mut item: MenuItem) -> RepositoryResult<MenuItem> {
        item.id = Some(ObjectId::new());
        let now = now_rfc3339();
        item.created_at = Some(now.clone());
        item.updated_at = Some(now);
        self.collection
            .insert_one(&item, None)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to create menu item", e))?;
        info!("Menu item created");
        Ok(item)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<MenuItem>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch menu item: {}", e)))
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_restaurant(&self, restaurant: &ObjectId, only_available: bool) -> RepositoryResult<Vec<MenuItem>> {
        let mut filter = doc! { "restaurant": restaurant };
        if only_available {
            filter.insert("isAvailable", true);
        }
        self.collect(Some(filter)).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> RepositoryResult<Vec<MenuItem>> {
        self.collect(None).await
    }

    #[tracing::instrument(skip(self, item))]
    async fn update(&self, id: &ObjectId, item: MenuItem) -> RepositoryResult<MenuItem> {
        let mut set = bson::to_document(&item)?;
        set.remove("_id");
        set.remove("restaurant");
        set.remove("createdAt");
        self.set_fields(id, set).await
    }

    #[tracing::instrument(skip(self))]
    async fn set_availability(&self, id: &ObjectId, is_available: bool) -> RepositoryResult<MenuItem> {
        self.set_fields(id, doc! { "isAvailable": is_available }).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete menu item: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found("Menu item not found"));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_restaurant(&self, restaurant: &ObjectId) -> RepositoryResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "restaurant": restaurant }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete menu items: {}", e)))?;
        info!("Deleted {} menu items of restaurant {}", result.deleted_count, restaurant);
        Ok(result.deleted_count)
    }
}
