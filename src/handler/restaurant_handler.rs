use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Extension,
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::menu_dto::MenuQuery;
use crate::dto::response::ApiResponse;
use crate::dto::restaurant_dto::{AvailabilityRequest, CreateRestaurantRequest, RestaurantListQuery, UpdateRestaurantRequest};
use crate::middlewares::auth_middleware::AuthUser;
use crate::service::restaurant_service::RestaurantService;
use crate::util::error::HandlerError;
use crate::util::extract::JsonBody;
use crate::util::upload::MultipartForm;

#[derive(Clone)]
pub struct RestaurantState {
    pub service: Arc<dyn RestaurantService>,
    pub max_upload_bytes: usize,
}

pub async fn create_restaurant_handler(
    State(state): State<RestaurantState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let form = MultipartForm::read(multipart, state.max_upload_bytes).await?;
    let payload = CreateRestaurantRequest::from_form(&form)?;
    payload.validate()?;
    let created = state.service.create(&user, payload, form.image).await?;
    Ok(ApiResponse::created(created).with_message("Restaurant submitted for approval"))
}

pub async fn list_restaurants_handler(
    State(state): State<RestaurantState>,
    Query(query): Query<RestaurantListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(state.service.list(query.available).await?))
}

pub async fn list_unavailable_handler(State(state): State<RestaurantState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(state.service.list(Some(false)).await?))
}

pub async fn get_restaurant_handler(
    State(state): State<RestaurantState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(state.service.get(&id).await?))
}

pub async fn owner_restaurant_handler(
    State(state): State<RestaurantState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(state.service.get_owned(&user).await?))
}

pub async fn restaurant_menu_handler(
    State(state): State<RestaurantState>,
    Query(query): Query<MenuQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = query
        .restaurant_id
        .ok_or_else(|| HandlerError::bad_request("restaurantId is required"))?;
    Ok(ApiResponse::ok(state.service.available_menu(&id).await?))
}

pub async fn update_restaurant_handler(
    State(state): State<RestaurantState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let form = MultipartForm::read(multipart, state.max_upload_bytes).await?;
    let payload = UpdateRestaurantRequest::from_form(&form);
    payload.validate()?;
    let updated = state.service.update(&user, &id, payload, form.image).await?;
    Ok(ApiResponse::ok(updated))
}

pub async fn set_availability_handler(
    State(state): State<RestaurantState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<AvailabilityRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let updated = state.service.set_availability(&id, payload.is_available).await?;
    Ok(ApiResponse::ok(updated))
}

pub async fn delete_restaurant_handler(
    State(state): State<RestaurantState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    state.service.delete(&user, &id).await?;
    Ok(ApiResponse::message("Restaurant deleted successfully"))
}
