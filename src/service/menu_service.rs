use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::menu_dto::{CreateMenuItemRequest, MenuItemResponse, UpdateMenuItemRequest};
use crate::model::menu_item::MenuItem;
use crate::model::restaurant::Restaurant;
use crate::model::user::User;
use crate::repository::menu_item_repo::MenuItemRepository;
use crate::repository::restaurant_repo::RestaurantRepository;
use crate::service::restaurant_service::ensure_owner;
use crate::util::error::{parse_object_id, ServiceError};
use crate::util::image_store::ImageStore;
use crate::util::upload::UploadedImage;

#[async_trait]
pub trait MenuService: Send + Sync {
    async fn get(&self, id: &str) -> Result<MenuItemResponse, ServiceError>;
    /// Every item, or only those of one restaurant.
    async fn list(&self, restaurant_id: Option<&str>) -> Result<Vec<MenuItemResponse>, ServiceError>;
    async fn mine(&self, owner: &User) -> Result<Vec<MenuItemResponse>, ServiceError>;
    async fn create(&self, owner: &User, req: CreateMenuItemRequest, image: Option<UploadedImage>) -> Result<MenuItemResponse, ServiceError>;
    async fn update(&self, caller: &User, id: &str, req: UpdateMenuItemRequest, image: Option<UploadedImage>) -> Result<MenuItemResponse, ServiceError>;
    async fn set_availability(&self, caller: &User, id: &str, is_available: bool) -> Result<MenuItemResponse, ServiceError>;
    async fn delete(&self, caller: &User, id: &str) -> Result<(), ServiceError>;
}

pub struct MenuServiceImpl {
    menu_repo: Arc<dyn MenuItemRepository>,
    restaurant_repo: Arc<dyn RestaurantRepository>,
    images: Arc<dyn ImageStore>,
}

impl MenuServiceImpl {
    pub fn new(
        menu_repo: Arc<dyn MenuItemRepository>,
        restaurant_repo: Arc<dyn RestaurantRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        MenuServiceImpl { menu_repo, restaurant_repo, images }
    }

    async fn find(&self, id: &ObjectId) -> Result<MenuItem, ServiceError> {
        self.menu_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Menu item not found".to_string()))
    }

    async fn owned_restaurant(&self, owner: &User) -> Result<Restaurant, ServiceError> {
        let owner_id = owner.id.ok_or_else(|| ServiceError::Unauthorized("User not found".to_string()))?;
        self.restaurant_repo
            .find_by_owner(&owner_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No restaurant found for this owner".to_string()))
    }

    /// Load an item and check the caller may manage it.
    async fn editable(&self, caller: &User, id: &str) -> Result<MenuItem, ServiceError> {
        let id = parse_object_id(id, "menu item")?;
        let item = self.find(&id).await?;
        let restaurant = self
            .restaurant_repo
            .find_by_id(&item.restaurant)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Restaurant not found".to_string()))?;
        ensure_owner(caller, &restaurant)?;
        Ok(item)
    }

    async fn store_image(&self, image: Option<UploadedImage>) -> Result<Option<String>, ServiceError> {
        let Some(image) = image else {
            return Ok(None);
        };
        self.images.save("menu", &image).await.map(Some).map_err(|e| {
            error!("{}", e);
            ServiceError::InternalError("Failed to store image".to_string())
        })
    }
}

fn responses(items: Vec<MenuItem>) -> Vec<MenuItemResponse> {
    items.into_iter().map(MenuItemResponse::from).collect()
}

#[async_trait]
impl MenuService for MenuServiceImpl {
    async fn get(&self, id: &str) -> Result<MenuItemResponse, ServiceError> {
        let id = parse_object_id(id, "menu item")?;
        Ok(self.find(&id).await?.into())
    }

    async fn list(&self, restaurant_id: Option<&str>) -> Result<Vec<MenuItemResponse>, ServiceError> {
        let items = match restaurant_id {
            Some(raw) => {
                let id = parse_object_id(raw, "restaurant")?;
                self.menu_repo.list_by_restaurant(&id, false).await?
            }
            None => self.menu_repo.list_all().await?,
        };
        Ok(responses(items))
    }

    async fn mine(&self, owner: &User) -> Result<Vec<MenuItemResponse>, ServiceError> {
        let restaurant = self.owned_restaurant(owner).await?;
        let id = restaurant.id.ok_or_else(|| ServiceError::InternalError("Stored restaurant has no id".into()))?;
        Ok(responses(self.menu_repo.list_by_restaurant(&id, false).await?))
    }

    #[instrument(skip(self, owner, req, image), fields(name = %req.name))]
    async fn create(&self, owner: &User, req: CreateMenuItemRequest, image: Option<UploadedImage>) -> Result<MenuItemResponse, ServiceError> {
        let restaurant = self.owned_restaurant(owner).await?;
        let restaurant_id = restaurant.id.ok_or_else(|| ServiceError::InternalError("Stored restaurant has no id".into()))?;
        let image = self.store_image(image).await?;
        let item = MenuItem {
            id: None,
            name: req.name,
            price: req.price,
            category: req.category,
            description: req.description,
            image,
            is_available: true,
            restaurant: restaurant_id,
            created_at: None,
            updated_at: None,
        };
        let created = self.menu_repo.create(item).await?;
        info!("Menu item created");
        Ok(created.into())
    }

    #[instrument(skip(self, caller, req, image))]
    async fn update(&self, caller: &User, id: &str, req: UpdateMenuItemRequest, image: Option<UploadedImage>) -> Result<MenuItemResponse, ServiceError> {
        let mut item = self.editable(caller, id).await?;
        let item_id = item.id.ok_or_else(|| ServiceError::InternalError("Stored menu item has no id".into()))?;
        let old_image = item.image.clone();
        req.apply_to(&mut item);
        if let Some(path) = self.store_image(image).await? {
            item.image = Some(path);
        }
        let updated = self.menu_repo.update(&item_id, item).await?;
        if let Some(old) = old_image.filter(|old| updated.image.as_ref() != Some(old)) {
            self.images.remove(&old).await;
        }
        Ok(updated.into())
    }

    #[instrument(skip(self, caller))]
    async fn set_availability(&self, caller: &User, id: &str, is_available: bool) -> Result<MenuItemResponse, ServiceError> {
        let item = self.editable(caller, id).await?;
        let item_id = item.id.ok_or_else(|| ServiceError::InternalError("Stored menu item has no id".into()))?;
        Ok(self.menu_repo.set_availability(&item_id, is_available).await?.into())
    }

    #[instrument(skip(self, caller))]
    async fn delete(&self, caller: &User, id: &str) -> Result<(), ServiceError> {
        let item = self.editable(caller, id).await?;
        let item_id = item.id.ok_or_else(|| ServiceError::InternalError("Stored menu item has no id".into()))?;
        self.menu_repo.delete(&item_id).await?;
        if let Some(image) = item.image {
            self.images.remove(&image).await;
        }
        info!("Menu item deleted");
        Ok(())
    }
}
