use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use crate::handler::restaurant_handler::{
    create_restaurant_handler,
    delete_restaurant_handler,
    get_restaurant_handler,
    list_restaurants_handler,
    list_unavailable_handler,
    owner_restaurant_handler,
    restaurant_menu_handler,
    set_availability_handler,
    update_restaurant_handler,
    RestaurantState,
};
use crate::middlewares::auth_middleware::{require_auth, restrict_to, AllowedRoles, AuthState};
use crate::model::user::UserRole;

/// Headroom for the text fields sent next to the image.
pub const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn restaurant_router(state: RestaurantState, auth_state: AuthState) -> Router {
    let body_limit = state.max_upload_bytes + FORM_OVERHEAD_BYTES;

    let public = Router::new()
        .route("/", get(list_restaurants_handler))
        .route("/menu", get(restaurant_menu_handler))
        .route("/{id}", get(get_restaurant_handler));

    let applicants = Router::new()
        .route("/", post(create_restaurant_handler))
        .route_layer(middleware::from_fn_with_state(
            AllowedRoles(&[UserRole::Customer, UserRole::RestaurantAdmin]),
            restrict_to,
        ))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    let owners = Router::new()
        .route("/owner", get(owner_restaurant_handler))
        .route_layer(middleware::from_fn_with_state(AllowedRoles(&[UserRole::RestaurantAdmin]), restrict_to))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    let managers = Router::new()
        .route("/{id}", put(update_restaurant_handler).delete(delete_restaurant_handler))
        .route_layer(middleware::from_fn_with_state(
            AllowedRoles(&[UserRole::RestaurantAdmin, UserRole::SystemAdmin]),
            restrict_to,
        ))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    let admin = Router::new()
        .route("/unavailable", get(list_unavailable_handler))
        .route("/{id}/availability", patch(set_availability_handler))
        .route_layer(middleware::from_fn_with_state(AllowedRoles(&[UserRole::SystemAdmin]), restrict_to))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public
        .merge(applicants)
        .merge(owners)
        .merge(managers)
        .merge(admin)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
