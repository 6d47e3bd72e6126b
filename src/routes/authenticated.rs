use crate::{
    AppState,
    handlers::{articles, auth},
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Routes open to any signed-in account. Article mutations additionally run
/// the ownership check inside the handler: authors touch only their own
/// articles, editors may update any, admins may do anything.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/auth/profile", get(auth::profile))
        .route("/articles", post(articles::create_article))
        .route(
            "/articles/{id}",
            put(articles::update_article).delete(articles::delete_article),
        )
}
