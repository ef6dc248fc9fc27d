use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Extension,
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::menu_dto::{CreateMenuItemRequest, MenuQuery, UpdateMenuItemRequest};
use crate::dto::response::ApiResponse;
use crate::dto::restaurant_dto::AvailabilityRequest;
use crate::middlewares::auth_middleware::AuthUser;
use crate::service::menu_service::MenuService;
use crate::util::error::HandlerError;
use crate::util::extract::JsonBody;
use crate::util::upload::MultipartForm;

#[derive(Clone)]
pub struct MenuState {
    pub service: Arc<dyn MenuService>,
    pub max_upload_bytes: usize,
}

pub async fn get_menu_item_handler(
    State(state): State<MenuState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(state.service.get(&id).await?))
}

pub async fn list_menu_handler(
    State(state): State<MenuState>,
    Query(query): Query<MenuQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(state.service.list(query.restaurant_id.as_deref()).await?))
}

pub async fn my_menu_handler(
    State(state): State<MenuState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(state.service.mine(&user).await?))
}

pub async fn create_menu_item_handler(
    State(state): State<MenuState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let form = MultipartForm::read(multipart, state.max_upload_bytes).await?;
    let payload = CreateMenuItemRequest::from_form(&form)?;
    payload.validate()?;
    let created = state.service.create(&user, payload, form.image).await?;
    Ok(ApiResponse::created(created))
}

pub async fn update_menu_item_handler(
    State(state): State<MenuState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let form = MultipartForm::read(multipart, state.max_upload_bytes).await?;
    let payload = UpdateMenuItemRequest::from_form(&form)?;
    payload.validate()?;
    Ok(ApiResponse::ok(state.service.update(&user, &id, payload, form.image).await?))
}

pub async fn menu_availability_handler(
    State(state): State<MenuState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<AvailabilityRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(state.service.set_availability(&user, &id, payload.is_available).await?))
}

pub async fn delete_menu_item_handler(
    State(state): State<MenuState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    state.service.delete(&user, &id).await?;
    Ok(ApiResponse::message("Menu item deleted successfully"))
}
