use crate::{
    AppState,
    handlers::{articles, auth, categories, comments, pages, system},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token: reads of articles, categories and
/// pages, visitor comments, registration and login.
///
/// Single-article reads are not restricted to `published`; a draft is visible
/// to anyone who knows its id or slug.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // GET /articles?page&limit&status&category&language&search
        .route("/articles", get(articles::list_articles))
        // {id} is a numeric id or a slug
        .route("/articles/{id}", get(articles::get_article))
        .route("/categories", get(categories::list_categories))
        .route("/categories/{id}", get(categories::get_category))
        .route("/pages", get(pages::list_pages))
        // {id} is the page slug; the shared name keeps the editorial routes mergeable
        .route("/pages/{id}", get(pages::get_page))
        .route("/comments", post(comments::create_comment))
        .route(
            "/comments/article/{article_id}",
            get(comments::list_article_comments),
        )
}
