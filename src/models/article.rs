use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::pagination::PageInfo;

string_enum! {
    /// ArticleStatus
    ///
    /// `draft` → `published` → `archived`. Only the first move into
    /// `published` stamps `published_at`.
    ArticleStatus("article status") {
        #[default]
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
}

impl ArticleStatus {
    /// Value for `published_at` after a write that leaves the article in `self`.
    ///
    /// An existing timestamp always wins, so publishing twice (or archiving and
    /// re-publishing) never moves it.
    pub fn published_at(
        self,
        current: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match (current, self) {
            (Some(ts), _) => Some(ts),
            (None, ArticleStatus::Published) => Some(now),
            (None, _) => None,
        }
    }
}

/// Article
///
/// A row of the `articles` table. `category_name` and `author_name` are only
/// populated by the read queries that join `categories` and `users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub category_id: Option<i32>,
    pub author_id: i32,
    pub language: String,
    #[sqlx(try_from = "String")]
    pub status: ArticleStatus,
    pub views: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub category_name: Option<String>,
    #[sqlx(default)]
    pub author_name: Option<String>,
}

/// ArticleFilter
///
/// Predicates shared by the list query and its count query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub status: ArticleStatus,
    /// Category slug.
    pub category: Option<String>,
    pub language: Option<String>,
    /// Case-insensitive substring of title or content.
    pub search: Option<String>,
}

/// ArticleListQuery
///
/// Raw query string for `GET /articles`. Values are kept as strings so that
/// non-numeric paging input falls back to defaults instead of rejecting.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// `draft`, `published` (default) or `archived`.
    pub status: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub language: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub category_id: Option<i32>,
    pub author_id: i32,
    pub language: String,
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
}

/// Fully resolved column values for an update.
///
/// `publish_at` is only applied when the stored `published_at` is still null.
#[derive(Debug, Clone)]
pub struct ArticleChanges {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub category_id: Option<i32>,
    pub language: String,
    pub status: ArticleStatus,
    pub publish_at: Option<DateTime<Utc>>,
}

/// CreateArticleRequest
///
/// Input payload for `POST /articles`. The author is always the caller.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateArticleRequest {
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(length(min = 3, max = 255, message = "Title must be 3-255 characters"))]
    pub title: String,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[serde(default, deserialize_with = "crate::validation::blank_as_none")]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::blank_as_none")]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default, deserialize_with = "crate::validation::blank_as_none")]
    #[validate(length(min = 2, max = 10, message = "Invalid language code"))]
    pub language: Option<String>,
    #[serde(default)]
    pub status: Option<ArticleStatus>,
}

/// UpdateArticleRequest
///
/// Partial update payload for `PUT /articles/{id}`; omitted fields keep their
/// stored value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateArticleRequest {
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 3, max = 255, message = "Title must be 3-255 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::blank_as_none")]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::blank_as_none")]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default, deserialize_with = "crate::validation::blank_as_none")]
    #[validate(length(min = 2, max = 10, message = "Invalid language code"))]
    pub language: Option<String>,
    #[serde(default)]
    pub status: Option<ArticleStatus>,
}

// --- Response envelopes ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleListResponse {
    pub articles: Vec<Article>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleResponse {
    pub article: Article,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleCreatedResponse {
    pub message: String,
    #[serde(rename = "articleId")]
    pub article_id: i32,
    pub article: Article,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleUpdatedResponse {
    pub message: String,
    pub article: Article,
}
