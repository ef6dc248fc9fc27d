use axum::{middleware, routing::{get, post}, Router};

use crate::handler::cart_handler::{
    add_to_cart_handler,
    clear_cart_handler,
    decrement_handler,
    get_cart_handler,
    remove_line_handler,
    CartHandlerState,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};

/// Every cart route acts on the caller's own cart.
pub fn cart_router(service: CartHandlerState, auth_state: AuthState) -> Router {
    Router::new()
        .route("/", get(get_cart_handler).delete(clear_cart_handler))
        .route(
            "/{menu_item_id}",
            post(add_to_cart_handler)
                .patch(decrement_handler)
                .delete(remove_line_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
