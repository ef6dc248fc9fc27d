use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::model::user::{User, UserRole};
use crate::service::rbac_service::RbacService;
use crate::service::user_service::UserService;
use crate::util::error::HandlerError;
use crate::util::jwt::{bearer_token, TokenService};

/// The authenticated account, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    /// Id of the account; present on every stored user.
    pub fn id(&self) -> Result<ObjectId, HandlerError> {
        self.0.id.ok_or_else(|| HandlerError::unauthorized("User not found"))
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenService>,
    pub users: Arc<dyn UserService>,
}

/// Validate the bearer access token and load the user it names.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized("No token provided"))?;
    let token = bearer_token(header_value).map_err(|_| HandlerError::unauthorized("No token provided"))?;

    let claims = state.tokens.validate_access_token(token).map_err(|e| {
        debug!("Rejected access token: {}", e);
        HandlerError::unauthorized("Invalid token")
    })?;
    let id = ObjectId::parse_str(&claims.sub).map_err(|_| HandlerError::unauthorized("Invalid token"))?;
    let user = state
        .users
        .find(&id)
        .await?
        .ok_or_else(|| HandlerError::unauthorized("User not found"))?;

    req.extensions_mut().insert(AuthUser(user));
    Ok(next.run(req).await)
}

/// Platform roles allowed through [`restrict_to`].
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(pub &'static [UserRole]);

fn current_user(req: &Request<Body>) -> Result<&User, HandlerError> {
    req.extensions()
        .get::<AuthUser>()
        .map(|u| &u.0)
        .ok_or_else(|| HandlerError::unauthorized("Not authenticated"))
}

/// Must run after [`require_auth`].
pub async fn restrict_to(
    State(allowed): State<AllowedRoles>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let user = current_user(&req)?;
    if !allowed.0.contains(&user.role) {
        warn!("{} ({}) denied; needs one of {:?}", user.email, user.role, allowed.0);
        return Err(HandlerError::forbidden("You do not have permission to perform this action"));
    }
    Ok(next.run(req).await)
}

/// Name of an RBAC role or permission a route requires.
#[derive(Clone)]
pub struct RbacGuard {
    pub rbac: Arc<dyn RbacService>,
    pub name: Arc<str>,
}

impl RbacGuard {
    pub fn new(rbac: Arc<dyn RbacService>, name: &str) -> Self {
        RbacGuard { rbac, name: Arc::from(name) }
    }
}

pub async fn require_rbac_role(
    State(guard): State<RbacGuard>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let roles = guard.rbac.roles_of(current_user(&req)?).await?;
    if !roles.iter().any(|r| r.name == *guard.name) {
        return Err(HandlerError::forbidden("Access denied"));
    }
    Ok(next.run(req).await)
}

pub async fn require_permission(
    State(guard): State<RbacGuard>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let roles = guard.rbac.roles_of(current_user(&req)?).await?;
    if !roles.iter().any(|r| r.has_permission(&guard.name)) {
        return Err(HandlerError::forbidden("Access denied"));
    }
    Ok(next.run(req).await)
}
