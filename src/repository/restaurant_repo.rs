use crate::model::restaurant::Restaurant;
use crate::repository::repository_error::{now_rfc3339, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use tracing::{error, info};

#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn create(&self, restaurant: Restaurant) -> RepositoryResult<Restaurant>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Restaurant>>;
    async fn find_by_owner(&self, owner: &ObjectId) -> RepositoryResult<Option<Restaurant>>;
    /// `None` lists everything; `Some(flag)` filters on `isAvailable`.
    async fn list(&self, available: Option<bool>) -> RepositoryResult<Vec<Restaurant>>;
    async fn update(&self, id: &ObjectId, restaurant: Restaurant) -> RepositoryResult<Restaurant>;
    async fn set_availability(&self, id: &ObjectId, is_available: bool) -> RepositoryResult<Restaurant>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
}

pub struct MongoRestaurantRepository {
    collection: Collection<Restaurant>,
}

impl MongoRestaurantRepository {
    pub async fn new(db: &Database) -> RepositoryResult<Self> {
        let collection = db.collection::<Restaurant>("restaurants");
        // one restaurant per owner
        let index = IndexModel::builder()
            .keys(doc! { "owner": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection
            .create_index(index, None)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to create restaurants.owner index", e))?;
        Ok(MongoRestaurantRepository { collection })
    }

    fn after() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }
}

#[async_trait]
impl RestaurantRepository for MongoRestaurantRepository {
    #[tracing::instrument(skip(self, restaurant), fields(store = %restaurant.store_name))]
    async fn create(&self, mut restaurant: Restaurant) -> RepositoryResult<Restaurant> {
        restaurant.id = Some(ObjectId::new());
        let now = now_rfc3339();
        restaurant.created_at = Some(now.clone());
        restaurant.updated_at = Some(now);
        self.collection
            .insert_one(&restaurant, None)
            .await
            .map_err(|e| RepositoryError::from_mongo("Failed to create restaurant", e))?;
        info!("Restaurant created");
        Ok(restaurant)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Restaurant>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch restaurant: {}", e)))
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_owner(&self, owner: &ObjectId) -> RepositoryResult<Option<Restaurant>> {
        self.collection
            .find_one(doc! { "owner": owner }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch restaurant by owner: {}", e)))
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, available: Option<bool>) -> RepositoryResult<Vec<Restaurant>> {
        let filter = available.map(|flag| doc! { "isAvailable": flag });
        let cursor = self
            .collection
            .find(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list restaurants: {}", e)))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to read restaurants: {}", e)))
    }

    #[tracing::instrument(skip(self, restaurant))]
    async fn update(&self, id: &ObjectId, restaurant: Restaurant) -> RepositoryResult<Restaurant> {
        let mut set: Document = bson::to_document(&restaurant)?;
        // identity and ownership are not editable here
        set.remove("_id");
        set.remove("owner");
        set.remove("createdAt");
        set.insert("updatedAt", now_rfc3339());
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, Self::after())
            .await
            .map_err(|e| {
                error!("Failed to update restaurant {}: {}", id, e);
                RepositoryError::from_mongo("Failed to update restaurant", e)
            })?;
        updated.ok_or_else(|| RepositoryError::not_found("Restaurant not found"))
    }

    #[tracing::instrument(skip(self))]
    async fn set_availability(&self, id: &ObjectId, is_available: bool) -> RepositoryResult<Restaurant> {
        let update = doc! { "$set": { "isAvailable": is_available, "updatedAt": now_rfc3339() } };
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update, Self::after())
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update availability: {}", e)))?;
        updated.ok_or_else(|| RepositoryError::not_found("Restaurant not found"))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete restaurant: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found("Restaurant not found"));
        }
        Ok(())
    }
}
