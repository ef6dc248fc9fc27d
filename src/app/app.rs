use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::admin_user_conf::{AdminUserConfig, DEFAULT_SUPER_ADMIN_ROLE};
use crate::config::app_conf::AppConfig;
use crate::config::mongo_conf::MongoConfig;
use crate::config::{EmailConfig, JwtConfig, OtpConfig, RateLimitConfig, RedisConfig, SocialAuthConfig};
use crate::handler::menu_handler::MenuState;
use crate::handler::restaurant_handler::RestaurantState;
use crate::middlewares::auth_middleware::AuthState;
use crate::middlewares::rate_limit_middleware::{rate_limit, RateLimitState};
use crate::repository::menu_item_repo::MongoMenuItemRepository;
use crate::repository::permission_repo::MongoPermissionRepository;
use crate::repository::restaurant_repo::MongoRestaurantRepository;
use crate::repository::role_repo::MongoRoleRepository;
use crate::repository::user_repo::MongoUserRepository;
use crate::router::{
    auth_router::auth_router,
    cart_router::cart_router,
    menu_router::menu_router,
    rbac_router::rbac_router,
    restaurant_router::restaurant_router,
    user_router::user_router,
};
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::service::cart_service::{CartService, CartServiceImpl};
use crate::service::menu_service::{MenuService, MenuServiceImpl};
use crate::service::rbac_service::{RbacService, RbacServiceImpl};
use crate::service::restaurant_service::{RestaurantService, RestaurantServiceImpl};
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::clock::SystemClock;
use crate::util::email::SmtpEmailService;
use crate::util::image_store::{LocalImageStore, PUBLIC_PREFIX};
use crate::util::jwt::{JwtTokenService, TokenService};
use crate::util::menu_catalog::HttpMenuCatalog;
use crate::util::oauth::HttpOAuthClient;
use crate::util::otp::RedisOtpService;
use crate::util::redis::{RedisService, RedisServiceTrait};

/// Everything the HTTP layer needs, already wired.
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub carts: Arc<dyn CartService>,
    pub restaurants: Arc<dyn RestaurantService>,
    pub menus: Arc<dyn MenuService>,
    pub rbac: Arc<dyn RbacService>,
    pub tokens: Arc<dyn TokenService>,
    pub redis: Arc<dyn RedisServiceTrait>,
    pub rate_limit: RateLimitConfig,
    pub super_admin_role: String,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
}

/// Mount every API router under `/api`, plus `/health` and the uploaded images.
pub fn build_router(services: AppServices) -> Router {
    let auth_state = AuthState {
        tokens: services.tokens.clone(),
        users: services.users.clone(),
    };
    let restaurant_state = RestaurantState {
        service: services.restaurants.clone(),
        max_upload_bytes: services.max_upload_bytes,
    };
    let menu_state = MenuState {
        service: services.menus.clone(),
        max_upload_bytes: services.max_upload_bytes,
    };
    let rate_state = RateLimitState {
        config: services.rate_limit.clone(),
        redis: services.redis.clone(),
    };

    Router::new()
        .nest("/api/auth", auth_router(services.auth.clone(), auth_state.clone()))
        .nest("/api/user", user_router(services.users.clone(), auth_state.clone()))
        .nest("/api/cart", cart_router(services.carts.clone(), auth_state.clone()))
        .nest("/api/restaurants", restaurant_router(restaurant_state, auth_state.clone()))
        .nest("/api/menu", menu_router(menu_state, auth_state.clone()))
        .nest("/api/admin", rbac_router(services.rbac.clone(), auth_state, &services.super_admin_role))
        .nest_service(PUBLIC_PREFIX, ServeDir::new(&services.upload_dir))
        .route("/health", get(|| async { "OK" }))
        .layer(middleware::from_fn_with_state(rate_state, rate_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();
        let jwt_config = JwtConfig::from_env().expect("JWT config error");
        let mongo_config = MongoConfig::from_env().expect("Mongo config error");
        let redis_config = RedisConfig::from_env().expect("Redis config error");
        let email_config = EmailConfig::from_env().expect("Email config error");
        let otp_config = OtpConfig::from_env().expect("OTP config error");
        let rate_limit_config = RateLimitConfig::from_env().expect("Rate limit config error");
        let social_config = SocialAuthConfig::from_env().expect("Social auth config error");

        let db = mongo_config.connect().await.expect("MongoDB connection error");
        let redis: Arc<dyn RedisServiceTrait> =
            Arc::new(RedisService::new(redis_config).await.expect("RedisService error"));

        let user_repo = Arc::new(MongoUserRepository::new(&db).await.expect("User repo error"));
        let restaurant_repo = Arc::new(MongoRestaurantRepository::new(&db).await.expect("Restaurant repo error"));
        let menu_repo = Arc::new(MongoMenuItemRepository::new(&db));
        let role_repo = Arc::new(MongoRoleRepository::new(&db).await.expect("Role repo error"));
        let permission_repo = Arc::new(MongoPermissionRepository::new(&db).await.expect("Permission repo error"));

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(jwt_config));
        let otp = Arc::new(RedisOtpService::new(otp_config, redis.clone(), Arc::new(SystemClock)));
        let mailer = Arc::new(SmtpEmailService::new(email_config).expect("SMTP transport error"));
        let frontend_url = social_config.frontend_url.clone();
        let oauth = Arc::new(HttpOAuthClient::new(social_config).expect("OAuth client error"));
        let catalog = Arc::new(
            HttpMenuCatalog::new(&config.restaurant_service_url, config.catalog_timeout_secs)
                .expect("Menu catalog client error"),
        );
        let images = Arc::new(LocalImageStore::new(&config.upload_dir));

        let rbac: Arc<dyn RbacService> =
            Arc::new(RbacServiceImpl::new(user_repo.clone(), role_repo, permission_repo));
        let users: Arc<dyn UserService> = Arc::new(UserServiceImpl::new(user_repo.clone()));
        let auth: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
            user_repo.clone(),
            rbac.clone(),
            tokens.clone(),
            otp,
            mailer,
            oauth,
            frontend_url,
        ));
        let carts: Arc<dyn CartService> = Arc::new(CartServiceImpl::new(user_repo.clone(), catalog));
        let restaurants: Arc<dyn RestaurantService> = Arc::new(RestaurantServiceImpl::new(
            restaurant_repo.clone(),
            menu_repo.clone(),
            user_repo,
            images.clone(),
        ));
        let menus: Arc<dyn MenuService> = Arc::new(MenuServiceImpl::new(menu_repo, restaurant_repo, images));

        let super_admin_role = match AdminUserConfig::from_env() {
            Ok(admin) => {
                match rbac.bootstrap(&admin).await {
                    Ok(()) => info!("RBAC defaults and system admin are in place"),
                    Err(e) => error!("Failed to bootstrap RBAC defaults: {}", e),
                }
                admin.super_admin_role
            }
            Err(e) => {
                warn!("Admin user config not loaded, skipping bootstrap: {}", e);
                DEFAULT_SUPER_ADMIN_ROLE.to_string()
            }
        };

        let services = AppServices {
            auth,
            users,
            carts,
            restaurants,
            menus,
            rbac,
            tokens,
            redis,
            rate_limit: rate_limit_config,
            super_admin_role,
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        };
        let router = build_router(services);
        App { config, router }
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(self.config.host.parse().expect("Invalid host"), self.config.port);
        info!("Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind address");
        axum::serve(listener, self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .expect("Failed to start server");
    }
}
