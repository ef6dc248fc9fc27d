pub mod user;
pub mod cart;
pub mod restaurant;
pub mod menu_item;
pub mod role;
pub mod permission;
