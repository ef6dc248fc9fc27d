pub mod jwt;
pub mod password;
pub mod redis;
pub mod email;
pub mod otp;
pub mod clock;
pub mod image_store;
pub mod upload;
pub mod menu_catalog;
pub mod oauth;
pub mod logger;
pub mod error;
pub mod extract;
