use std::time::Duration;

use axum::{
    Router,
    extract::FromRef,
    http::{
        HeaderName, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod password;
pub mod repository;
pub mod routes;
pub mod seed;
pub mod slug;
pub mod validation;

pub use config::AppConfig;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

use config::Env;
use handlers::{articles, auth as auth_handlers, categories, comments, pages, system};

/// ApiDoc
///
/// OpenAPI document for every route under `/api`, served as JSON at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        system::index, system::health,
        auth_handlers::register, auth_handlers::login, auth_handlers::profile,
        articles::list_articles, articles::get_article, articles::create_article,
        articles::update_article, articles::delete_article,
        categories::list_categories, categories::get_category, categories::create_category,
        categories::update_category, categories::delete_category,
        pages::list_pages, pages::get_page, pages::create_page, pages::update_page,
        pages::delete_page,
        comments::list_article_comments, comments::create_comment, comments::list_comments,
        comments::update_comment, comments::delete_comment, comments::approve_comment,
        comments::reject_comment,
    ),
    components(
        schemas(
            errors::ErrorBody, errors::FieldError, models::MessageResponse,
            models::Role, models::UserSummary, models::UserProfile, models::RegisterRequest,
            models::LoginRequest, models::AuthResponse, models::ProfileResponse,
            models::ArticleStatus, models::Article, models::CreateArticleRequest,
            models::UpdateArticleRequest, models::ArticleListResponse, models::ArticleResponse,
            models::ArticleCreatedResponse, models::ArticleUpdatedResponse,
            pagination::PageInfo,
            models::Category, models::CreateCategoryRequest, models::UpdateCategoryRequest,
            models::CategoryListResponse, models::CategoryResponse,
            models::CategoryCreatedResponse, models::CategoryUpdatedResponse,
            models::PageStatus, models::Page, models::CreatePageRequest,
            models::UpdatePageRequest, models::PageListResponse, models::PageResponse,
            models::PageCreatedResponse, models::PageUpdatedResponse,
            models::CommentStatus, models::Comment, models::CreateCommentRequest,
            models::UpdateCommentRequest, models::CommentListResponse,
            models::CommentCreatedResponse, models::CommentUpdatedResponse,
            system::HealthResponse, system::ApiIndex,
        )
    ),
    tags(
        (name = "cms", description = "Multilingual CMS API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared by every request: the persistence layer and the immutable
/// configuration. Handlers pull either part through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// CORS allow-list built from the configured origins.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86_400))
}

/// create_router
///
/// Assembles the full application: `/api` route groups with their access
/// layers, the index and docs, the JSON 404 fallback, then request-id,
/// tracing and CORS around everything.
pub fn create_router(state: AppState) -> Router {
    errors::expose_internal_details(state.config.env == Env::Local);
    let cors = cors_layer(&state.config);
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(system::index))
        .nest("/api", routes::api_routes(&state))
        .fallback(system::not_found)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Span per request, keyed by the `x-request-id` set by the outer layer.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
