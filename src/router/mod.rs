pub mod auth_router;
pub mod user_router;
pub mod cart_router;
pub mod restaurant_router;
pub mod menu_router;
pub mod rbac_router;
