use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::menu_dto::MenuItemResponse;
use crate::dto::restaurant_dto::{CreateRestaurantRequest, RestaurantResponse, UpdateRestaurantRequest};
use crate::model::restaurant::Restaurant;
use crate::model::user::{User, UserRole};
use crate::repository::menu_item_repo::MenuItemRepository;
use crate::repository::restaurant_repo::RestaurantRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::{parse_object_id, ServiceError};
use crate::util::image_store::ImageStore;
use crate::util::upload::UploadedImage;

#[async_trait]
pub trait RestaurantService: Send + Sync {
    async fn create(&self, owner: &User, req: CreateRestaurantRequest, image: Option<UploadedImage>) -> Result<RestaurantResponse, ServiceError>;
    async fn list(&self, available: Option<bool>) -> Result<Vec<RestaurantResponse>, ServiceError>;
    async fn get(&self, id: &str) -> Result<RestaurantResponse, ServiceError>;
    async fn get_owned(&self, owner: &User) -> Result<RestaurantResponse, ServiceError>;
    async fn update(&self, caller: &User, id: &str, req: UpdateRestaurantRequest, image: Option<UploadedImage>) -> Result<RestaurantResponse, ServiceError>;
    /// Approve or suspend a listing. Approval promotes a customer owner to restaurant admin.
    async fn set_availability(&self, id: &str, is_available: bool) -> Result<RestaurantResponse, ServiceError>;
    async fn delete(&self, caller: &User, id: &str) -> Result<(), ServiceError>;
    async fn available_menu(&self, restaurant_id: &str) -> Result<Vec<MenuItemResponse>, ServiceError>;
}

pub struct RestaurantServiceImpl {
    restaurant_repo: Arc<dyn RestaurantRepository>,
    menu_repo: Arc<dyn MenuItemRepository>,
    user_repo: Arc<dyn UserRepository>,
    images: Arc<dyn ImageStore>,
}

impl RestaurantServiceImpl {
    pub fn new(
        restaurant_repo: Arc<dyn RestaurantRepository>,
        menu_repo: Arc<dyn MenuItemRepository>,
        user_repo: Arc<dyn UserRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        RestaurantServiceImpl { restaurant_repo, menu_repo, user_repo, images }
    }

    async fn find(&self, id: &ObjectId) -> Result<Restaurant, ServiceError> {
        self.restaurant_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Restaurant not found".to_string()))
    }

    async fn store_image(&self, image: Option<UploadedImage>) -> Result<Option<String>, ServiceError> {
        match image {
            Some(image) => self
                .images
                .save("restaurant", &image)
                .await
                .map(Some)
                .map_err(|e| {
                    error!("{}", e);
                    ServiceError::InternalError("Failed to store image".to_string())
                }),
            None => Ok(None),
        }
    }
}

/// Owners manage their own listing; system admins manage any.
pub(crate) fn ensure_owner(caller: &User, restaurant: &Restaurant) -> Result<(), ServiceError> {
    if caller.role == UserRole::SystemAdmin {
        return Ok(());
    }
    match caller.id {
        Some(id) if restaurant.is_owned_by(&id) => Ok(()),
        _ => Err(ServiceError::Forbidden("You do not own this restaurant".to_string())),
    }
}

fn caller_id(user: &User) -> Result<ObjectId, ServiceError> {
    user.id.ok_or_else(|| ServiceError::Unauthorized("User not found".to_string()))
}

#[async_trait]
impl RestaurantService for RestaurantServiceImpl {
    #[instrument(skip(self, owner, req, image), fields(store = %req.store_name))]
    async fn create(&self, owner: &User, req: CreateRestaurantRequest, image: Option<UploadedImage>) -> Result<RestaurantResponse, ServiceError> {
        let owner_id = caller_id(owner)?;
        if self.restaurant_repo.find_by_owner(&owner_id).await?.is_some() {
            return Err(ServiceError::Conflict("You already own a restaurant".to_string()));
        }
        let image = self.store_image(image).await?;
        let restaurant = Restaurant {
            id: None,
            store_name: req.store_name,
            brand_name: req.brand_name,
            description: req.description,
            street: req.street,
            city: req.city,
            postal_code: req.postal_code,
            country: req.country,
            phone: req.phone,
            email: req.email,
            is_available: false,
            owner: owner_id,
            image,
            created_at: None,
            updated_at: None,
        };
        let created = self.restaurant_repo.create(restaurant).await?;
        info!("Restaurant submitted for approval");
        Ok(created.into())
    }

    async fn list(&self, available: Option<bool>) -> Result<Vec<RestaurantResponse>, ServiceError> {
        let restaurants = self.restaurant_repo.list(available).await?;
        Ok(restaurants.into_iter().map(RestaurantResponse::from).collect())
    }

    async fn get(&self, id: &str) -> Result<RestaurantResponse, ServiceError> {
        let id = parse_object_id(id, "restaurant")?;
        Ok(self.find(&id).await?.into())
    }

    async fn get_owned(&self, owner: &User) -> Result<RestaurantResponse, ServiceError> {
        let owner_id = caller_id(owner)?;
        self.restaurant_repo
            .find_by_owner(&owner_id)
            .await?
            .map(RestaurantResponse::from)
            .ok_or_else(|| ServiceError::NotFound("No restaurant found for this owner".to_string()))
    }

    #[instrument(skip(self, caller, req, image))]
    async fn update(&self, caller: &User, id: &str, req: UpdateRestaurantRequest, image: Option<UploadedImage>) -> Result<RestaurantResponse, ServiceError> {
        let id = parse_object_id(id, "restaurant")?;
        let mut restaurant = self.find(&id).await?;
        ensure_owner(caller, &restaurant)?;

        let old_image = restaurant.image.clone();
        req.apply_to(&mut restaurant);
        if let Some(path) = self.store_image(image).await? {
            restaurant.image = Some(path);
        }
        let updated = self.restaurant_repo.update(&id, restaurant).await?;
        if let Some(old) = old_image.filter(|old| updated.image.as_ref() != Some(old)) {
            self.images.remove(&old).await;
        }
        info!("Restaurant updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn set_availability(&self, id: &str, is_available: bool) -> Result<RestaurantResponse, ServiceError> {
        let id = parse_object_id(id, "restaurant")?;
        self.find(&id).await?;
        let restaurant = self.restaurant_repo.set_availability(&id, is_available).await?;

        if is_available {
            if let Some(owner) = self.user_repo.find_by_id(&restaurant.owner).await? {
                if owner.role == UserRole::Customer {
                    self.user_repo.set_role(&restaurant.owner, UserRole::RestaurantAdmin).await?;
                    info!("Promoted owner {} to restaurant_admin", restaurant.owner);
                }
            }
        }
        Ok(restaurant.into())
    }

    #[instrument(skip(self, caller))]
    async fn delete(&self, caller: &User, id: &str) -> Result<(), ServiceError> {
        let id = parse_object_id(id, "restaurant")?;
        let restaurant = self.find(&id).await?;
        ensure_owner(caller, &restaurant)?;

        let removed = self.menu_repo.delete_by_restaurant(&id).await?;
        self.restaurant_repo.delete(&id).await?;
        if let Some(image) = restaurant.image {
            self.images.remove(&image).await;
        }
        info!("Restaurant deleted with {} menu items", removed);
        Ok(())
    }

    async fn available_menu(&self, restaurant_id: &str) -> Result<Vec<MenuItemResponse>, ServiceError> {
        let id = parse_object_id(restaurant_id, "restaurant")?;
        let items = self.menu_repo.list_by_restaurant(&id, true).await?;
        Ok(items.into_iter().map(MenuItemResponse::from).collect())
    }
}
