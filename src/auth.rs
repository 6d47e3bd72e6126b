use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::AppConfig,
    errors::{AppError, AppResult},
    models::Role,
};

/// Claims
///
/// Payload of the HS256 tokens issued at login and registration. The identity
/// is carried in full, so authenticated requests never hit the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// AuthUser
///
/// Resolved identity of an authenticated request. Usable as a handler
/// argument; the first extraction caches it in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Signs a token for `user` that expires `ttl` from now.
pub fn issue_token(user: &AuthUser, secret: &str, ttl: TimeDelta) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp().max(0) as usize,
        exp: (now + ttl).timestamp().max(0) as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Checks signature and expiry. No clock leeway is granted.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized("Access denied. No token provided.".to_string())
            })?;

        let config = AppConfig::from_ref(state);
        let user = AuthUser::from(verify_token(token, &config.jwt_secret)?);
        tracing::debug!(user_id = user.id, role = %user.role, "authenticated request");

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Rejects unauthenticated requests and makes the identity available to
/// [`require_roles`] and the handlers further down.
pub async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

pub type RoleSet = &'static [Role];

/// Editors and admins: category, page and comment management.
pub const STAFF: RoleSet = &[Role::Admin, Role::Editor];
/// Anyone with an account may write articles.
pub const CONTRIBUTORS: RoleSet = &[Role::Admin, Role::Editor, Role::Author];

/// Role gate, layered inside [`auth_middleware`].
///
/// ```ignore
/// router.route_layer(middleware::from_fn_with_state(STAFF, require_roles))
/// ```
pub async fn require_roles(
    State(allowed): State<RoleSet>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    if !allowed.contains(&user.role) {
        tracing::debug!(user_id = user.id, role = %user.role, "role not permitted");
        return Err(AppError::forbidden());
    }

    Ok(next.run(request).await)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleAction {
    Update,
    Delete,
}

/// Ownership rule for articles: admins may do anything, editors may edit any
/// article, everyone else only touches their own.
pub fn can_modify_article(actor: &AuthUser, author_id: i32, action: ArticleAction) -> bool {
    match (actor.role, action) {
        (Role::Admin, _) => true,
        (Role::Editor, ArticleAction::Update) => true,
        _ => actor.id == author_id,
    }
}
