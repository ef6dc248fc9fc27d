use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handler::rbac_handler::{
    assign_role_handler,
    create_permission_handler,
    create_role_handler,
    delete_permission_handler,
    delete_role_handler,
    delete_user_handler,
    list_permissions_handler,
    list_roles_handler,
    list_users_handler,
    remove_role_handler,
    update_role_handler,
    RbacHandlerState,
};
use crate::middlewares::auth_middleware::{require_auth, require_permission, require_rbac_role, AuthState, RbacGuard};
use crate::service::rbac_service::{DELETE_USER, VIEW_USERS};

/// Administration of roles and permissions, reserved to members of `super_admin_role`.
pub fn rbac_router(service: RbacHandlerState, auth_state: AuthState, super_admin_role: &str) -> Router {
    let view_users = RbacGuard::new(service.clone(), VIEW_USERS);
    let delete_users = RbacGuard::new(service.clone(), DELETE_USER);

    let management = Router::new()
        .route("/roles", post(create_role_handler).get(list_roles_handler))
        .route("/roles/{id}", put(update_role_handler).delete(delete_role_handler))
        .route("/permissions", post(create_permission_handler).get(list_permissions_handler))
        .route("/permissions/{id}", delete(delete_permission_handler))
        .route("/users/{user_id}/roles", post(assign_role_handler))
        .route("/users/{user_id}/roles/{role_id}", delete(remove_role_handler));

    let listing = Router::new()
        .route("/users", get(list_users_handler))
        .route_layer(middleware::from_fn_with_state(view_users, require_permission));

    let removal = Router::new()
        .route("/users/{user_id}", delete(delete_user_handler))
        .route_layer(middleware::from_fn_with_state(delete_users, require_permission));

    management
        .merge(listing)
        .merge(removal)
        .route_layer(middleware::from_fn_with_state(
            RbacGuard::new(service.clone(), super_admin_role),
            require_rbac_role,
        ))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
