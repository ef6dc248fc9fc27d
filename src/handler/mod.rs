pub mod auth_handler;
pub mod user_handler;
pub mod cart_handler;
pub mod restaurant_handler;
pub mod menu_handler;
pub mod rbac_handler;
