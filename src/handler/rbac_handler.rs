use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::dto::rbac_dto::{AssignRoleRequest, CreatePermissionRequest, CreateRoleRequest, UpdateRoleRequest};
use crate::dto::response::ApiResponse;
use crate::service::rbac_service::RbacService;
use crate::util::error::HandlerError;
use crate::util::extract::{JsonBody, ValidJson};

pub type RbacHandlerState = Arc<dyn RbacService>;

pub async fn create_role_handler(
    State(service): State<RbacHandlerState>,
    ValidJson(payload): ValidJson<CreateRoleRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::created(service.create_role(payload).await?))
}

pub async fn list_roles_handler(State(service): State<RbacHandlerState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(service.list_roles().await?))
}

pub async fn update_role_handler(
    State(service): State<RbacHandlerState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateRoleRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(service.update_role(&id, payload).await?))
}

pub async fn delete_role_handler(
    State(service): State<RbacHandlerState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_role(&id).await?;
    Ok(ApiResponse::message("Role deleted successfully"))
}

pub async fn create_permission_handler(
    State(service): State<RbacHandlerState>,
    ValidJson(payload): ValidJson<CreatePermissionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::created(service.create_permission(payload).await?))
}

pub async fn list_permissions_handler(State(service): State<RbacHandlerState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(service.list_permissions().await?))
}

pub async fn delete_permission_handler(
    State(service): State<RbacHandlerState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_permission(&id).await?;
    Ok(ApiResponse::message("Permission deleted successfully"))
}

pub async fn assign_role_handler(
    State(service): State<RbacHandlerState>,
    Path(user_id): Path<String>,
    JsonBody(payload): JsonBody<AssignRoleRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(service.assign_role(&user_id, &payload.role_id).await?))
}

pub async fn remove_role_handler(
    State(service): State<RbacHandlerState>,
    Path((user_id, role_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(service.remove_role(&user_id, &role_id).await?))
}

pub async fn list_users_handler(State(service): State<RbacHandlerState>) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(service.list_users().await?))
}

pub async fn delete_user_handler(
    State(service): State<RbacHandlerState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_user(&user_id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
