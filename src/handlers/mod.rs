use std::future::Future;

use crate::{
    errors::{AppError, AppResult},
    repository::{RepoError, RepoResult, Repository},
    slug::{self, SlugScope},
};

pub mod articles;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod pages;
pub mod system;

/// Parses a numeric path id; anything else is a 400.
pub(crate) fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::bad_request("Invalid ID"))
}

/// Picks a free slug for `base` in `scope`.
///
/// The bounded base is used as-is when nobody holds it; otherwise a
/// millisecond timestamp is appended. `exclude` is the row being updated.
pub(crate) async fn resolve_slug(
    repo: &dyn Repository,
    scope: SlugScope,
    base: &str,
    exclude: Option<i32>,
) -> AppResult<String> {
    let candidate = slug::bounded(base, scope.max_len());
    if !repo.slug_exists(scope, &candidate, exclude).await? {
        return Ok(candidate);
    }
    Ok(slug::with_suffix(base, &slug::timestamp_suffix(), scope.max_len()))
}

/// Runs an insert or update keyed by `slug`, retrying once with a fresh
/// timestamp suffix if a concurrent writer took the slug in between.
pub(crate) async fn with_slug_retry<T, F, Fut>(
    scope: SlugScope,
    base: &str,
    slug: String,
    mut write: F,
) -> AppResult<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = RepoResult<T>>,
{
    match write(slug).await {
        Err(RepoError::UniqueViolation(constraint)) => {
            tracing::warn!(%constraint, "slug collision on write, retrying with suffix");
            let retry = slug::with_suffix(base, &slug::timestamp_suffix(), scope.max_len());
            Ok(write(retry).await?)
        }
        other => Ok(other?),
    }
}
