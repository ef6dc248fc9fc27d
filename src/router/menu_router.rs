use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use crate::handler::menu_handler::{
    create_menu_item_handler,
    delete_menu_item_handler,
    get_menu_item_handler,
    list_menu_handler,
    menu_availability_handler,
    my_menu_handler,
    update_menu_item_handler,
    MenuState,
};
use crate::middlewares::auth_middleware::{require_auth, restrict_to, AllowedRoles, AuthState};
use crate::model::user::UserRole;
use crate::router::restaurant_router::FORM_OVERHEAD_BYTES;

pub fn menu_router(state: MenuState, auth_state: AuthState) -> Router {
    let body_limit = state.max_upload_bytes + FORM_OVERHEAD_BYTES;

    let public = Router::new()
        .route("/", get(list_menu_handler))
        .route("/{id}", get(get_menu_item_handler));

    let owners = Router::new()
        .route("/", post(create_menu_item_handler))
        .route("/mine", get(my_menu_handler))
        .route_layer(middleware::from_fn_with_state(AllowedRoles(&[UserRole::RestaurantAdmin]), restrict_to))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    let managers = Router::new()
        .route("/{id}", put(update_menu_item_handler).delete(delete_menu_item_handler))
        .route("/{id}/availability", patch(menu_availability_handler))
        .route_layer(middleware::from_fn_with_state(
            AllowedRoles(&[UserRole::RestaurantAdmin, UserRole::SystemAdmin]),
            restrict_to,
        ))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public
        .merge(owners)
        .merge(managers)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
