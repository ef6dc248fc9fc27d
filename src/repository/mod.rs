pub mod repository_error;
pub mod user_repo;
pub mod restaurant_repo;
pub mod menu_item_repo;
pub mod role_repo;
pub mod permission_repo;
