use axum::{middleware, routing::{delete, get, patch}, Router};

use crate::handler::user_handler::{
    change_role_handler,
    delete_account_handler,
    get_user_handler,
    profile_handler,
    update_profile_handler,
    UserHandlerState,
};
use crate::middlewares::auth_middleware::{require_auth, restrict_to, AllowedRoles, AuthState};
use crate::model::user::UserRole;

pub fn user_router(service: UserHandlerState, auth_state: AuthState) -> Router {
    let public = Router::new()
        .route("/{id}", get(get_user_handler));

    let authenticated = Router::new()
        .route("/profile", get(profile_handler))
        .route("/update", patch(update_profile_handler))
        .route("/delete", delete(delete_account_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    let admin = Router::new()
        .route("/{id}/role", patch(change_role_handler))
        .route_layer(middleware::from_fn_with_state(AllowedRoles(&[UserRole::SystemAdmin]), restrict_to))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public
        .merge(authenticated)
        .merge(admin)
        .with_state(service)
}
