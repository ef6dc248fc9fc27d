use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Extension,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::dto::auth_dto::{EmailRequest, LoginRequest, OAuthCallbackQuery, RefreshTokenRequest, RegisterRequest, VerifyOtpRequest};
use crate::dto::response::ApiResponse;
use crate::middlewares::auth_middleware::AuthUser;
use crate::service::auth_service::AuthService;
use crate::util::error::HandlerError;
use crate::util::extract::ValidJson;

pub type AuthHandlerState = Arc<dyn AuthService>;

pub async fn register_handler(
    State(service): State<AuthHandlerState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    service.register(payload).await?;
    Ok(ApiResponse::created_message("User registered. OTP sent to email."))
}

pub async fn verify_otp_handler(
    State(service): State<AuthHandlerState>,
    ValidJson(payload): ValidJson<VerifyOtpRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    service.verify_otp(&payload.email, &payload.code).await?;
    Ok(ApiResponse::message("Email verified successfully"))
}

pub async fn resend_otp_handler(
    State(service): State<AuthHandlerState>,
    ValidJson(payload): ValidJson<EmailRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    service.resend_otp(&payload.email).await?;
    Ok(ApiResponse::message("OTP sent to email."))
}

pub async fn login_handler(
    State(service): State<AuthHandlerState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.login(&payload.email, &payload.password).await?;
    Ok(ApiResponse::ok(res))
}

pub async fn refresh_token_handler(
    State(service): State<AuthHandlerState>,
    ValidJson(payload): ValidJson<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let tokens = service.refresh(&payload.refresh_token).await?;
    Ok(ApiResponse::ok(tokens))
}

pub async fn me_handler(
    State(service): State<AuthHandlerState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(ApiResponse::ok(service.me(user).await?))
}

pub async fn social_login_handler(
    State(service): State<AuthHandlerState>,
    Path(provider): Path<String>,
) -> Result<Redirect, HandlerError> {
    let url = service.social_authorize_url(&provider)?;
    Ok(Redirect::to(&url))
}

pub async fn social_callback_handler(
    State(service): State<AuthHandlerState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Redirect, HandlerError> {
    if let Some(err) = query.error {
        warn!("{} returned error: {}", provider, err);
        return Err(HandlerError::unauthorized(format!("{} login was cancelled", provider)));
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| HandlerError::bad_request("Missing authorization code"))?;
    let target = service.social_callback(&provider, &code).await?;
    info!("{} login complete", provider);
    Ok(Redirect::to(&target))
}
