use axum::{middleware, routing::{get, post}, Router};

use crate::handler::auth_handler::{
    login_handler,
    me_handler,
    refresh_token_handler,
    register_handler,
    resend_otp_handler,
    social_callback_handler,
    social_login_handler,
    verify_otp_handler,
    AuthHandlerState,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};

pub fn auth_router(service: AuthHandlerState, auth_state: AuthState) -> Router {
    let public = Router::new()
        .route("/register", post(register_handler))
        .route("/verify-otp", post(verify_otp_handler))
        .route("/resend-otp", post(resend_otp_handler))
        .route("/login", post(login_handler))
        .route("/refresh-token", post(refresh_token_handler))
        .route("/{provider}", get(social_login_handler))
        .route("/{provider}/callback", get(social_callback_handler));

    let authenticated = Router::new()
        .route("/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public
        .merge(authenticated)
        .with_state(service)
}
