use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use std::sync::Arc;

use crate::dto::response::ApiResponse;
use crate::dto::user_dto::{UpdateRoleRequest, UpdateUserRequest, UserResponse};
use crate::middlewares::auth_middleware::AuthUser;
use crate::service::user_service::UserService;
use crate::util::error::HandlerError;
use crate::util::extract::{JsonBody, ValidJson};

pub type UserHandlerState = Arc<dyn UserService>;

pub async fn profile_handler(Extension(AuthUser(user)): Extension<AuthUser>) -> impl IntoResponse {
    ApiResponse::ok(UserResponse::from(user))
}

pub async fn get_user_handler(
    State(service): State<UserHandlerState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(service.public_profile(&id).await?))
}

pub async fn update_profile_handler(
    State(service): State<UserHandlerState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let updated = service.update_profile(&auth.id()?, payload).await?;
    Ok(ApiResponse::ok(updated).with_message("Profile updated successfully"))
}

pub async fn delete_account_handler(
    State(service): State<UserHandlerState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_account(&auth.id()?).await?;
    Ok(ApiResponse::message("Account deleted successfully"))
}

pub async fn change_role_handler(
    State(service): State<UserHandlerState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateRoleRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let updated = service.change_role(&id, payload.role).await?;
    Ok(ApiResponse::ok(updated).with_message("Role updated successfully"))
}
