use axum::{
    Router,
    body::Body,
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
    middleware,
    routing::get,
};
use chrono::{TimeDelta, Utc};
use cms_backend::{
    AppConfig, AppState, MemoryRepository,
    auth::{
        ArticleAction, AuthUser, CONTRIBUTORS, Claims, STAFF, TokenError, auth_middleware,
        can_modify_article, issue_token, require_roles, verify_token,
    },
    errors::AppError,
    models::Role,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::Arc;
use tower::ServiceExt;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

fn identity(id: i32, role: Role) -> AuthUser {
    AuthUser {
        id,
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
        role,
    }
}

fn create_token(user: &AuthUser, ttl: TimeDelta) -> String {
    issue_token(user, TEST_JWT_SECRET, ttl).expect("token should sign")
}

fn create_app_state() -> AppState {
    let config = AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };

    AppState {
        repo: Arc::new(MemoryRepository::new()),
        config,
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri, bearer: Option<&str>) -> Parts {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let (parts, _) = builder.body(Body::empty()).unwrap().into_parts();
    parts
}

/// Router with one route behind `auth_middleware` and a role guard.
fn guarded_router(allowed: &'static [Role]) -> Router {
    let state = create_app_state();
    Router::new()
        .route("/guarded", get(|user: AuthUser| async move { user.role.to_string() }))
        .route_layer(middleware::from_fn_with_state(allowed, require_roles))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

async fn call_guarded(allowed: &'static [Role], token: Option<String>) -> StatusCode {
    let mut request = Request::builder().uri("/guarded");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    guarded_router(allowed)
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

// --- Token round-trip ---

#[test]
fn test_issued_token_verifies_to_same_identity() {
    let user = identity(7, Role::Editor);
    let token = create_token(&user, TimeDelta::days(7));

    let claims = verify_token(&token, TEST_JWT_SECRET).unwrap();
    assert_eq!(AuthUser::from(claims.clone()), user);
    assert!(claims.exp > claims.iat);
    assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
}

#[test]
fn test_tampered_signature_is_rejected() {
    let token = create_token(&identity(1, Role::Author), TimeDelta::hours(1));

    // flip a character in the middle of the signature segment
    let mut chars: Vec<char> = token.chars().collect();
    let at = chars.len() - 10;
    chars[at] = if chars[at] == 'A' { 'B' } else { 'A' };
    let forged: String = chars.into_iter().collect();

    assert_eq!(verify_token(&forged, TEST_JWT_SECRET), Err(TokenError::Invalid));
    assert_eq!(
        verify_token(&token, "a-different-secret"),
        Err(TokenError::Invalid)
    );
}

#[test]
fn test_tampered_payload_is_rejected() {
    // same header and signature, payload re-signed by someone without the secret
    let now = Utc::now().timestamp() as usize;
    let escalated = Claims {
        id: 1,
        username: "user1".to_string(),
        email: "user1@example.com".to_string(),
        role: Role::Admin,
        iat: now,
        exp: now + 3600,
    };
    let forged = encode(
        &Header::default(),
        &escalated,
        &EncodingKey::from_secret(b"attacker-secret"),
    )
    .unwrap();

    let genuine = create_token(&identity(1, Role::Author), TimeDelta::hours(1));
    let genuine_parts: Vec<&str> = genuine.split('.').collect();
    let forged_parts: Vec<&str> = forged.split('.').collect();
    let spliced = format!("{}.{}.{}", genuine_parts[0], forged_parts[1], genuine_parts[2]);

    assert_eq!(verify_token(&forged, TEST_JWT_SECRET), Err(TokenError::Invalid));
    assert_eq!(verify_token(&spliced, TEST_JWT_SECRET), Err(TokenError::Invalid));
}

#[test]
fn test_expired_token_is_rejected() {
    let token = create_token(&identity(1, Role::Admin), TimeDelta::seconds(-60));
    assert_eq!(verify_token(&token, TEST_JWT_SECRET), Err(TokenError::Expired));
}

#[test]
fn test_garbage_token_is_invalid() {
    assert_eq!(verify_token("not-a-jwt", TEST_JWT_SECRET), Err(TokenError::Invalid));
    assert_eq!(verify_token("", TEST_JWT_SECRET), Err(TokenError::Invalid));
}

// --- Extractor ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let user = identity(42, Role::Author);
    let token = create_token(&user, TimeDelta::hours(1));
    let app_state = create_app_state();

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap(), Some(&token));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .expect("valid token should authenticate");

    assert_eq!(auth_user, user);
    // cached for later extractors in the same request
    assert_eq!(parts.extensions.get::<AuthUser>(), Some(&user));
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap(), None);

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        err,
        AppError::Unauthorized("Access denied. No token provided.".to_string())
    );
}

#[tokio::test]
async fn test_auth_failure_with_non_bearer_scheme() {
    let app_state = create_app_state();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap(), None);
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Basic dXNlcjpwYXNz"),
    );

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let token = create_token(&identity(3, Role::Editor), TimeDelta::seconds(-5));
    let app_state = create_app_state();

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap(), Some(&token));
    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();

    assert_eq!(err, AppError::Unauthorized("Token expired".to_string()));
}

// --- Role guard ---

#[tokio::test]
async fn test_role_guard_allows_listed_roles() {
    for role in [Role::Admin, Role::Editor] {
        let token = create_token(&identity(1, role), TimeDelta::hours(1));
        assert_eq!(call_guarded(STAFF, Some(token)).await, StatusCode::OK);
    }
    for role in Role::ALL {
        let token = create_token(&identity(1, *role), TimeDelta::hours(1));
        assert_eq!(call_guarded(CONTRIBUTORS, Some(token)).await, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_role_guard_rejects_other_roles() {
    let token = create_token(&identity(1, Role::Author), TimeDelta::hours(1));
    assert_eq!(call_guarded(STAFF, Some(token)).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_guarded_route_without_token_is_unauthorized() {
    assert_eq!(call_guarded(STAFF, None).await, StatusCode::UNAUTHORIZED);
    assert_eq!(
        call_guarded(STAFF, Some("garbage".to_string())).await,
        StatusCode::UNAUTHORIZED
    );
}

// --- Ownership ---

#[test]
fn test_article_ownership_policy() {
    let author = identity(10, Role::Author);
    let editor = identity(20, Role::Editor);
    let admin = identity(30, Role::Admin);

    // own article
    assert!(can_modify_article(&author, 10, ArticleAction::Update));
    assert!(can_modify_article(&author, 10, ArticleAction::Delete));
    // someone else's
    assert!(!can_modify_article(&author, 99, ArticleAction::Update));
    assert!(!can_modify_article(&author, 99, ArticleAction::Delete));
    // editors edit anything but only delete their own
    assert!(can_modify_article(&editor, 99, ArticleAction::Update));
    assert!(!can_modify_article(&editor, 99, ArticleAction::Delete));
    assert!(can_modify_article(&editor, 20, ArticleAction::Delete));
    // admins do anything
    assert!(can_modify_article(&admin, 99, ArticleAction::Update));
    assert!(can_modify_article(&admin, 99, ArticleAction::Delete));
}
