#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use bson::oid::ObjectId;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use food_platform::app::app::{build_router, AppServices};
use food_platform::config::admin_user_conf::DEFAULT_SUPER_ADMIN_ROLE;
use food_platform::config::{JwtConfig, OtpConfig, RateLimitConfig};
use food_platform::model::cart::CartItem;
use food_platform::model::menu_item::MenuItem;
use food_platform::model::permission::Permission;
use food_platform::model::restaurant::Restaurant;
use food_platform::model::role::Role;
use food_platform::model::user::{User, UserRole};
use food_platform::repository::menu_item_repo::MenuItemRepository;
use food_platform::repository::permission_repo::PermissionRepository;
use food_platform::repository::repository_error::{RepositoryError, RepositoryResult};
use food_platform::repository::restaurant_repo::RestaurantRepository;
use food_platform::repository::role_repo::RoleRepository;
use food_platform::repository::user_repo::{ProfileUpdate, UserRepository};
use food_platform::service::auth_service::AuthServiceImpl;
use food_platform::service::cart_service::CartServiceImpl;
use food_platform::service::menu_service::MenuServiceImpl;
use food_platform::service::rbac_service::{RbacService, RbacServiceImpl};
use food_platform::service::restaurant_service::RestaurantServiceImpl;
use food_platform::service::user_service::UserServiceImpl;
use food_platform::util::clock::Clock;
use food_platform::util::email::{EmailError, EmailMessage, EmailSender};
use food_platform::util::image_store::LocalImageStore;
use food_platform::util::jwt::{JwtTokenService, TokenService};
use food_platform::util::menu_catalog::{CatalogEntry, CatalogError, MenuCatalog};
use food_platform::util::oauth::{OAuthClient, OAuthError, OAuthProvider, SocialProfile};
use food_platform::util::otp::RedisOtpService;
use food_platform::util::password::hash_password;
use food_platform::util::redis::{RedisError, RedisServiceTrait};

pub const PASSWORD: &str = "secret123";
pub const FRONTEND_URL: &str = "http://frontend.test";

fn missing(what: &str) -> RepositoryError {
    RepositoryError::NotFound(format!("{} not found", what))
}

fn stamp() -> Option<String> {
    Some(chrono::Utc::now().to_rfc3339())
}

// ---------------------------------------------------------------- users

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    fn with_user<F>(&self, id: &ObjectId, f: F) -> RepositoryResult<User>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.id.as_ref() == Some(id)).ok_or_else(|| missing("User"))?;
        f(user);
        user.updated_at = stamp();
        Ok(user.clone())
    }

    pub fn get(&self, id: &ObjectId) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id.as_ref() == Some(id)).cloned()
    }

    pub fn find_by_email_sync(&self, email: &str) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.email == email).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::AlreadyExists("Email already exists".to_string()));
        }
        user.id = Some(ObjectId::new());
        user.created_at = stamp();
        user.updated_at = user.created_at.clone();
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update_profile(&self, id: &ObjectId, update: ProfileUpdate) -> RepositoryResult<User> {
        self.with_user(id, |u| {
            if let Some(v) = update.first_name {
                u.first_name = v;
            }
            if let Some(v) = update.last_name {
                u.last_name = v;
            }
            if update.phone.is_some() {
                u.phone = update.phone;
            }
            if update.address.is_some() {
                u.address = update.address;
            }
        })
    }

    async fn set_role(&self, id: &ObjectId, role: UserRole) -> RepositoryResult<User> {
        self.with_user(id, |u| u.role = role)
    }

    async fn mark_verified(&self, email: &str) -> RepositoryResult<User> {
        let id = self
            .find_by_email(email)
            .await?
            .and_then(|u| u.id)
            .ok_or_else(|| missing("User"))?;
        self.with_user(&id, |u| u.is_verified = true)
    }

    async fn link_social(&self, id: &ObjectId, provider: &str, social_id: &str) -> RepositoryResult<User> {
        self.with_user(id, |u| {
            u.provider = Some(provider.to_string());
            u.social_id = Some(social_id.to_string());
            u.is_verified = true;
        })
    }

    async fn replace_cart(&self, id: &ObjectId, cart: Vec<CartItem>) -> RepositoryResult<User> {
        self.with_user(id, |u| u.cart = cart)
    }

    async fn add_role(&self, id: &ObjectId, role_id: &ObjectId) -> RepositoryResult<User> {
        self.with_user(id, |u| {
            if !u.roles.contains(role_id) {
                u.roles.push(*role_id);
            }
        })
    }

    async fn remove_role(&self, id: &ObjectId, role_id: &ObjectId) -> RepositoryResult<User> {
        self.with_user(id, |u| u.roles.retain(|r| r != role_id))
    }

    async fn pull_role_from_all(&self, role_id: &ObjectId) -> RepositoryResult<u64> {
        let mut users = self.users.lock().unwrap();
        let mut touched = 0;
        for user in users.iter_mut().filter(|u| u.roles.contains(role_id)) {
            user.roles.retain(|r| r != role_id);
            touched += 1;
        }
        Ok(touched)
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id.as_ref() != Some(id));
        if users.len() == before {
            return Err(missing("User"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------- restaurants

#[derive(Default)]
pub struct InMemoryRestaurantRepository {
    items: Mutex<Vec<Restaurant>>,
}

#[async_trait]
impl RestaurantRepository for InMemoryRestaurantRepository {
    async fn create(&self, mut restaurant: Restaurant) -> RepositoryResult<Restaurant> {
        restaurant.id = Some(ObjectId::new());
        restaurant.created_at = stamp();
        self.items.lock().unwrap().push(restaurant.clone());
        Ok(restaurant)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Restaurant>> {
        Ok(self.items.lock().unwrap().iter().find(|r| r.id.as_ref() == Some(id)).cloned())
    }

    async fn find_by_owner(&self, owner: &ObjectId) -> RepositoryResult<Option<Restaurant>> {
        Ok(self.items.lock().unwrap().iter().find(|r| &r.owner == owner).cloned())
    }

    async fn list(&self, available: Option<bool>) -> RepositoryResult<Vec<Restaurant>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|r| available.map_or(true, |flag| r.is_available == flag))
            .cloned()
            .collect())
    }

    async fn update(&self, id: &ObjectId, restaurant: Restaurant) -> RepositoryResult<Restaurant> {
        let mut items = self.items.lock().unwrap();
        let slot = items.iter_mut().find(|r| r.id.as_ref() == Some(id)).ok_or_else(|| missing("Restaurant"))?;
        *slot = Restaurant { id: Some(*id), updated_at: stamp(), ..restaurant };
        Ok(slot.clone())
    }

    async fn set_availability(&self, id: &ObjectId, is_available: bool) -> RepositoryResult<Restaurant> {
        let mut items = self.items.lock().unwrap();
        let slot = items.iter_mut().find(|r| r.id.as_ref() == Some(id)).ok_or_else(|| missing("Restaurant"))?;
        slot.is_available = is_available;
        Ok(slot.clone())
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        self.items.lock().unwrap().retain(|r| r.id.as_ref() != Some(id));
        Ok(())
    }
}

// ----------------------------------------------------------- menu items

#[derive(Default)]
pub struct InMemoryMenuItemRepository {
    items: Mutex<Vec<MenuItem>>,
}

impl InMemoryMenuItemRepository {
    pub fn count(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

#[async_trait]
impl MenuItemRepository for InMemoryMenuItemRepository {
    async fn create(&self, mut item: MenuItem) -> RepositoryResult<MenuItem> {
        item.id = Some(ObjectId::new());
        item.created_at = stamp();
        self.items.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<MenuItem>> {
        Ok(self.items.lock().unwrap().iter().find(|i| i.id.as_ref() == Some(id)).cloned())
    }

    async fn list_by_restaurant(&self, restaurant: &ObjectId, only_available: bool) -> RepositoryResult<Vec<MenuItem>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| &i.restaurant == restaurant && (!only_available || i.is_available))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<MenuItem>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn update(&self, id: &ObjectId, item: MenuItem) -> RepositoryResult<MenuItem> {
        let mut items = self.items.lock().unwrap();
        let slot = items.iter_mut().find(|i| i.id.as_ref() == Some(id)).ok_or_else(|| missing("Menu item"))?;
        *slot = MenuItem { id: Some(*id), updated_at: stamp(), ..item };
        Ok(slot.clone())
    }

    async fn set_availability(&self, id: &ObjectId, is_available: bool) -> RepositoryResult<MenuItem> {
        let mut items = self.items.lock().unwrap();
        let slot = items.iter_mut().find(|i| i.id.as_ref() == Some(id)).ok_or_else(|| missing("Menu item"))?;
        slot.is_available = is_available;
        Ok(slot.clone())
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        self.items.lock().unwrap().retain(|i| i.id.as_ref() != Some(id));
        Ok(())
    }

    async fn delete_by_restaurant(&self, restaurant: &ObjectId) -> RepositoryResult<u64> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| &i.restaurant != restaurant);
        Ok((before - items.len()) as u64)
    }
}

// ------------------------------------------------------------------ rbac

#[derive(Default)]
pub struct InMemoryRoleRepository {
    roles: Mutex<Vec<Role>>,
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn create(&self, mut role: Role) -> RepositoryResult<Role> {
        let mut roles = self.roles.lock().unwrap();
        if roles.iter().any(|r| r.name == role.name) {
            return Err(RepositoryError::AlreadyExists("Role already exists".to_string()));
        }
        role.id = Some(ObjectId::new());
        role.created_at = stamp();
        roles.push(role.clone());
        Ok(role)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Role>> {
        Ok(self.roles.lock().unwrap().iter().find(|r| r.id.as_ref() == Some(id)).cloned())
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Role>> {
        Ok(self.roles.lock().unwrap().iter().find(|r| r.name == name).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Role>> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.id.map_or(false, |id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn list(&self) -> RepositoryResult<Vec<Role>> {
        Ok(self.roles.lock().unwrap().clone())
    }

    async fn update(&self, id: &ObjectId, name: Option<String>, permissions: Option<Vec<ObjectId>>) -> RepositoryResult<Role> {
        let mut roles = self.roles.lock().unwrap();
        let role = roles.iter_mut().find(|r| r.id.as_ref() == Some(id)).ok_or_else(|| missing("Role"))?;
        if let Some(name) = name {
            role.name = name;
        }
        if let Some(permissions) = permissions {
            role.permissions = permissions;
        }
        Ok(role.clone())
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let mut roles = self.roles.lock().unwrap();
        let before = roles.len();
        roles.retain(|r| r.id.as_ref() != Some(id));
        if roles.len() == before {
            return Err(missing("Role"));
        }
        Ok(())
    }

    async fn pull_permission_from_all(&self, permission_id: &ObjectId) -> RepositoryResult<u64> {
        let mut touched = 0;
        for role in self.roles.lock().unwrap().iter_mut().filter(|r| r.permissions.contains(permission_id)) {
            role.permissions.retain(|p| p != permission_id);
            touched += 1;
        }
        Ok(touched)
    }
}

#[derive(Default)]
pub struct InMemoryPermissionRepository {
    permissions: Mutex<Vec<Permission>>,
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn create(&self, mut permission: Permission) -> RepositoryResult<Permission> {
        let mut permissions = self.permissions.lock().unwrap();
        if permissions.iter().any(|p| p.name == permission.name) {
            return Err(RepositoryError::AlreadyExists("Permission already exists".to_string()));
        }
        permission.id = Some(ObjectId::new());
        permission.created_at = stamp();
        permissions.push(permission.clone());
        Ok(permission)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Permission>> {
        Ok(self.permissions.lock().unwrap().iter().find(|p| p.name == name).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Permission>> {
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.id.map_or(false, |id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn list(&self) -> RepositoryResult<Vec<Permission>> {
        Ok(self.permissions.lock().unwrap().clone())
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let mut permissions = self.permissions.lock().unwrap();
        let before = permissions.len();
        permissions.retain(|p| p.id.as_ref() != Some(id));
        if permissions.len() == before {
            return Err(missing("Permission"));
        }
        Ok(())
    }
}

// ------------------------------------------------------------ utilities

/// Key/value store and counters without real expiry; TTLs are recorded only.
#[derive(Default)]
pub struct MockRedis {
    values: Mutex<HashMap<String, String>>,
    counters: Mutex<HashMap<String, i64>>,
    ttls: Mutex<HashMap<String, u64>>,
    pub fail: std::sync::atomic::AtomicBool,
    pub fail_next_expire: std::sync::atomic::AtomicBool,
}

impl MockRedis {
    fn check(&self) -> Result<(), RedisError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RedisError::ConnectionError("redis is down".to_string()));
        }
        Ok(())
    }

    pub fn ttl_of(&self, key: &str) -> Option<u64> {
        self.ttls.lock().unwrap().get(key).copied()
    }
}

#[async_trait]
impl RedisServiceTrait for MockRedis {
    async fn get_string(&self, key: &str) -> Result<Option<String>, RedisError> {
        self.check()?;
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set_string_with_expiry(&self, key: &str, value: &str, expiry_secs: u64) -> Result<(), RedisError> {
        self.check()?;
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
        self.ttls.lock().unwrap().insert(key.to_string(), expiry_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, RedisError> {
        self.check()?;
        Ok(self.values.lock().unwrap().remove(key).is_some())
    }

    async fn increment(&self, key: &str) -> Result<i64, RedisError> {
        self.check()?;
        let mut counters = self.counters.lock().unwrap();
        let count = counters.entry(key.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn expire(&self, key: &str, secs: u64) -> Result<bool, RedisError> {
        self.check()?;
        if self.fail_next_expire.swap(false, Ordering::SeqCst) {
            return Err(RedisError::OperationError("EXPIRE failed".to_string()));
        }
        self.ttls.lock().unwrap().insert(key.to_string(), secs);
        Ok(true)
    }

    async fn get_ttl(&self, key: &str) -> Result<i64, RedisError> {
        self.check()?;
        if let Some(ttl) = self.ttl_of(key) {
            return Ok(ttl as i64);
        }
        let exists = self.counters.lock().unwrap().contains_key(key) || self.values.lock().unwrap().contains_key(key);
        Ok(if exists { -1 } else { -2 })
    }

    async fn ping(&self) -> Result<String, RedisError> {
        self.check()?;
        Ok("PONG".to_string())
    }
}

#[derive(Default)]
pub struct CapturingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl CapturingMailer {
    /// Code from the most recent OTP mail to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.to == to)
            .and_then(|m| m.text_body.strip_prefix("Your OTP code is "))
            .and_then(|rest| rest.split('.').next())
            .map(str::to_string)
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailSender for CapturingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Knows a fixed set of menu items; everything else fails like an unreachable service.
#[derive(Default)]
pub struct FakeCatalog {
    pub entries: Mutex<HashMap<String, CatalogEntry>>,
    pub seen_authorization: Mutex<HashSet<String>>,
}

impl FakeCatalog {
    pub fn know(&self, id: &ObjectId, name: &str, image: &str) {
        self.entries.lock().unwrap().insert(
            id.to_hex(),
            CatalogEntry { name: name.to_string(), image: image.to_string() },
        );
    }
}

#[async_trait]
impl MenuCatalog for FakeCatalog {
    async fn lookup(&self, menu_item_id: &str, authorization: Option<&str>) -> Result<CatalogEntry, CatalogError> {
        if let Some(auth) = authorization {
            self.seen_authorization.lock().unwrap().insert(auth.to_string());
        }
        self.entries
            .lock()
            .unwrap()
            .get(menu_item_id)
            .cloned()
            .ok_or_else(|| CatalogError::Status(503))
    }
}

pub struct ManualClock(pub AtomicI64);

impl ManualClock {
    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix_secs(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct FakeOAuth;

#[async_trait]
impl OAuthClient for FakeOAuth {
    fn authorize_url(&self, provider: OAuthProvider) -> Result<String, OAuthError> {
        Ok(format!("https://{}.example/authorize", provider))
    }

    async fn exchange_code(&self, provider: OAuthProvider, code: &str) -> Result<SocialProfile, OAuthError> {
        if code != "good-code" {
            return Err(OAuthError::Exchange("bad code".to_string()));
        }
        Ok(SocialProfile {
            provider,
            social_id: format!("{}-42", provider),
            email: "social@example.com".to_string(),
        })
    }
}

// ------------------------------------------------------------ harness

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserRepository>,
    pub restaurants: Arc<InMemoryRestaurantRepository>,
    pub menu_items: Arc<InMemoryMenuItemRepository>,
    pub roles: Arc<InMemoryRoleRepository>,
    pub rbac: Arc<dyn RbacService>,
    pub tokens: Arc<dyn TokenService>,
    pub redis: Arc<MockRedis>,
    pub mailer: Arc<CapturingMailer>,
    pub catalog: Arc<FakeCatalog>,
    pub clock: Arc<ManualClock>,
    pub upload_dir: PathBuf,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
    pub location: Option<String>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_rate_limit(RateLimitConfig::default())
    }

    pub fn with_rate_limit(rate_limit: RateLimitConfig) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let restaurants = Arc::new(InMemoryRestaurantRepository::default());
        let menu_items = Arc::new(InMemoryMenuItemRepository::default());
        let roles = Arc::new(InMemoryRoleRepository::default());
        let permissions = Arc::new(InMemoryPermissionRepository::default());
        let redis = Arc::new(MockRedis::default());
        let mailer = Arc::new(CapturingMailer::default());
        let catalog = Arc::new(FakeCatalog::default());
        let clock = Arc::new(ManualClock(AtomicI64::new(1_700_000_000)));
        let upload_dir = std::env::temp_dir().join(format!("food-platform-test-{}", ObjectId::new().to_hex()));

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig::default()));
        let otp = Arc::new(RedisOtpService::new(OtpConfig::default(), redis.clone(), clock.clone()));
        let images = Arc::new(LocalImageStore::new(upload_dir.clone()));
        let rbac: Arc<dyn RbacService> =
            Arc::new(RbacServiceImpl::new(users.clone(), roles.clone(), permissions));

        let services = AppServices {
            auth: Arc::new(AuthServiceImpl::new(
                users.clone(),
                rbac.clone(),
                tokens.clone(),
                otp,
                mailer.clone(),
                Arc::new(FakeOAuth),
                FRONTEND_URL.to_string(),
            )),
            users: Arc::new(UserServiceImpl::new(users.clone())),
            carts: Arc::new(CartServiceImpl::new(users.clone(), catalog.clone())),
            restaurants: Arc::new(RestaurantServiceImpl::new(
                restaurants.clone(),
                menu_items.clone(),
                users.clone(),
                images.clone(),
            )),
            menus: Arc::new(MenuServiceImpl::new(menu_items.clone(), restaurants.clone(), images)),
            rbac: rbac.clone(),
            tokens: tokens.clone(),
            redis: redis.clone(),
            rate_limit,
            super_admin_role: DEFAULT_SUPER_ADMIN_ROLE.to_string(),
            upload_dir: upload_dir.to_string_lossy().into_owned(),
            max_upload_bytes: 1024 * 1024,
        };

        TestApp {
            router: build_router(services),
            users,
            restaurants,
            menu_items,
            roles,
            rbac,
            tokens,
            redis,
            mailer,
            catalog,
            clock,
            upload_dir,
        }
    }

    /// Insert a user straight into the store and hand back a bearer token for it.
    pub async fn seed_user(&self, email: &str, role: UserRole, verified: bool) -> (User, String) {
        let mut user = User::new(email);
        user.password_hash = Some(hash_password(PASSWORD).unwrap());
        user.role = role;
        user.is_verified = verified;
        let user = self.users.insert(user).await.unwrap();
        let pair = self.tokens.issue_pair(&user.id_hex(), &user.email, role).unwrap();
        (user, format!("Bearer {}", pair.access_token))
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        Response { status, body, location }
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Multipart request with text fields and an optional `image` part.
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> Response {
        const BOUNDARY: &str = "X-TEST-BOUNDARY";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
            );
        }
        if let Some((content_type, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, token)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}
