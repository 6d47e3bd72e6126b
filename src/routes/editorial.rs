use crate::{
    AppState,
    handlers::{categories, comments, pages},
};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

/// Editorial Router Module
///
/// Site structure and moderation: categories, pages and the comment queue.
/// Mounted behind the auth layer plus a `require_roles(STAFF)` guard, so
/// authors get 403 here.
pub fn editorial_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(categories::create_category))
        .route(
            "/categories/{id}",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route("/pages", post(pages::create_page))
        .route(
            "/pages/{id}",
            put(pages::update_page).delete(pages::delete_page),
        )
        // GET /comments?status=pending|approved|spam
        .route("/comments", get(comments::list_comments))
        .route(
            "/comments/{id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/comments/{id}/approve", patch(comments::approve_comment))
        .route("/comments/{id}/reject", patch(comments::reject_comment))
}
