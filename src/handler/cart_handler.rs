use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Extension,
};
use std::sync::Arc;

use crate::dto::cart_dto::{AddToCartRequest, CartResponse};
use crate::dto::response::ApiResponse;
use crate::middlewares::auth_middleware::AuthUser;
use crate::service::cart_service::CartService;
use crate::util::error::HandlerError;
use crate::util::extract::JsonBody;

pub type CartHandlerState = Arc<dyn CartService>;

pub async fn get_cart_handler(
    State(service): State<CartHandlerState>,
    Extension(auth): Extension<AuthUser>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HandlerError> {
    let authorization = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let cart = service.get(&auth.id()?, authorization).await?;
    Ok(ApiResponse::ok(cart))
}

pub async fn add_to_cart_handler(
    State(service): State<CartHandlerState>,
    Extension(auth): Extension<AuthUser>,
    Path(menu_item_id): Path<String>,
    JsonBody(payload): JsonBody<AddToCartRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let items = service.add(&auth.id()?, &menu_item_id, payload).await?;
    Ok(ApiResponse::ok(CartResponse::from_items(&items)))
}

pub async fn decrement_handler(
    State(service): State<CartHandlerState>,
    Extension(auth): Extension<AuthUser>,
    Path(menu_item_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let items = service.decrement(&auth.id()?, &menu_item_id).await?;
    Ok(ApiResponse::ok(CartResponse::from_items(&items)))
}

pub async fn remove_line_handler(
    State(service): State<CartHandlerState>,
    Extension(auth): Extension<AuthUser>,
    Path(menu_item_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let items = service.remove_line(&auth.id()?, &menu_item_id).await?;
    Ok(ApiResponse::ok(CartResponse::from_items(&items)))
}

pub async fn clear_cart_handler(
    State(service): State<CartHandlerState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    let items = service.clear(&auth.id()?).await?;
    Ok(ApiResponse::ok(CartResponse::from_items(&items)).with_message("Cart cleared successfully"))
}
