pub mod response;
pub mod auth_dto;
pub mod user_dto;
pub mod cart_dto;
pub mod restaurant_dto;
pub mod menu_dto;
pub mod rbac_dto;
