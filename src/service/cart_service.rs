use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::dto::cart_dto::{AddToCartRequest, CartItemResponse, EnrichedCartItem};
use crate::model::cart::{Cart, CartError, CartItem};
use crate::model::user::User;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::menu_catalog::{CatalogEntry, MenuCatalog};

pub const UNKNOWN_ITEM: &str = "Unknown Item";

impl From<CartError> for ServiceError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ItemNotInCart => ServiceError::NotFound(err.to_string()),
            CartError::MixedRestaurant | CartError::InvalidPrice => ServiceError::InvalidInput(err.to_string()),
        }
    }
}

#[async_trait]
pub trait CartService: Send + Sync {
    /// Cart lines with menu names and images looked up in the catalog.
    async fn get(&self, user_id: &ObjectId, authorization: Option<&str>) -> Result<Vec<EnrichedCartItem>, ServiceError>;
    async fn add(&self, user_id: &ObjectId, menu_item: &str, req: AddToCartRequest) -> Result<Vec<CartItem>, ServiceError>;
    async fn decrement(&self, user_id: &ObjectId, menu_item: &str) -> Result<Vec<CartItem>, ServiceError>;
    async fn remove_line(&self, user_id: &ObjectId, menu_item: &str) -> Result<Vec<CartItem>, ServiceError>;
    async fn clear(&self, user_id: &ObjectId) -> Result<Vec<CartItem>, ServiceError>;
}

pub struct CartServiceImpl {
    user_repo: Arc<dyn UserRepository>,
    catalog: Arc<dyn MenuCatalog>,
}

impl CartServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>, catalog: Arc<dyn MenuCatalog>) -> Self {
        CartServiceImpl { user_repo, catalog }
    }

    async fn load(&self, user_id: &ObjectId) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    async fn save(&self, user_id: &ObjectId, cart: Cart) -> Result<Vec<CartItem>, ServiceError> {
        let user = self.user_repo.replace_cart(user_id, cart.into_items()).await?;
        Ok(user.cart)
    }

    async fn enrich(&self, item: &CartItem, authorization: Option<&str>) -> EnrichedCartItem {
        let id = item.menu_item.to_hex();
        let entry = match self.catalog.lookup(&id, authorization).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error fetching menu item {}: {}", id, e);
                CatalogEntry { name: UNKNOWN_ITEM.to_string(), image: String::new() }
            }
        };
        let name = if entry.name.is_empty() { UNKNOWN_ITEM.to_string() } else { entry.name };
        EnrichedCartItem { item: CartItemResponse::from(item), name, image: entry.image }
    }
}

fn menu_item_id(raw: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| ServiceError::InvalidInput("Valid menu item ID, price, and restaurant are required".to_string()))
}

#[async_trait]
impl CartService for CartServiceImpl {
    #[instrument(skip(self, authorization))]
    async fn get(&self, user_id: &ObjectId, authorization: Option<&str>) -> Result<Vec<EnrichedCartItem>, ServiceError> {
        let user = self.load(user_id).await?;
        debug!("Enriching {} cart lines", user.cart.len());
        Ok(join_all(user.cart.iter().map(|item| self.enrich(item, authorization))).await)
    }

    #[instrument(skip(self, req))]
    async fn add(&self, user_id: &ObjectId, menu_item: &str, req: AddToCartRequest) -> Result<Vec<CartItem>, ServiceError> {
        let required = || ServiceError::InvalidInput("Valid menu item ID, price, and restaurant are required".to_string());
        let menu_item = menu_item_id(menu_item)?;
        let price = req.price().ok_or_else(required)?;
        let restaurant = req
            .restaurant
            .as_deref()
            .and_then(|r| ObjectId::parse_str(r.trim()).ok())
            .ok_or_else(required)?;

        let user = self.load(user_id).await?;
        let mut cart = Cart::from_items(user.cart);
        cart.add(menu_item, req.quantity(), price, restaurant)?;
        self.save(user_id, cart).await
    }

    #[instrument(skip(self))]
    async fn decrement(&self, user_id: &ObjectId, menu_item: &str) -> Result<Vec<CartItem>, ServiceError> {
        let user = self.load(user_id).await?;
        let menu_item = ObjectId::parse_str(menu_item.trim()).map_err(|_| ServiceError::from(CartError::ItemNotInCart))?;
        let mut cart = Cart::from_items(user.cart);
        cart.decrement(&menu_item)?;
        self.save(user_id, cart).await
    }

    #[instrument(skip(self))]
    async fn remove_line(&self, user_id: &ObjectId, menu_item: &str) -> Result<Vec<CartItem>, ServiceError> {
        let user = self.load(user_id).await?;
        let mut cart = Cart::from_items(user.cart);
        if let Ok(menu_item) = ObjectId::parse_str(menu_item.trim()) {
            cart.remove(&menu_item);
        }
        self.save(user_id, cart).await
    }

    #[instrument(skip(self))]
    async fn clear(&self, user_id: &ObjectId) -> Result<Vec<CartItem>, ServiceError> {
        self.load(user_id).await?;
        self.save(user_id, Cart::default()).await
    }
}
