use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::{AuthUser, issue_token},
    errors::{AppError, AppResult},
    models::{
        AuthResponse, LoginRequest, NewUser, ProfileResponse, RegisterRequest, Role, User,
        UserProfile, UserSummary,
    },
    password::{hash_password, verify_password},
    repository::RepoError,
    validation::ValidatedJson,
};

fn session_token(state: &AppState, user: &User) -> AppResult<String> {
    let identity = AuthUser {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
    };
    Ok(issue_token(
        &identity,
        &state.config.jwt_secret,
        state.config.jwt_ttl,
    )?)
}

/// register
///
/// [Public Route] Creates an `author` account and signs the caller in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Validation failed or user already exists", body = crate::errors::ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    if state
        .repo
        .user_exists(&payload.email, &payload.username)
        .await?
    {
        return Err(AppError::bad_request("User already exists"));
    }

    let password_hash = hash_password(payload.password).await?;
    let user = state
        .repo
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
            role: Role::Author,
        })
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent registration
            RepoError::UniqueViolation(_) => {
                AppError::bad_request("User already exists")
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = user.id, "user registered");
    let token = session_token(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: UserSummary::from(&user),
        }),
    ))
}

/// login
///
/// [Public Route] Exchanges email and password for a session token.
/// Unknown email and wrong password answer the same 401.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(payload.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = user.id, "password mismatch");
        return Err(invalid());
    }

    let token = session_token(&state, &user)?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary::from(&user),
    }))
}

/// profile
///
/// [Authenticated Route] Returns the caller's account as currently stored.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = crate::errors::ErrorBody),
        (status = 404, description = "Account no longer exists", body = crate::errors::ErrorBody)
    )
)]
pub async fn profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ProfileResponse>> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(ProfileResponse {
        user: UserProfile::from(&user),
    }))
}
