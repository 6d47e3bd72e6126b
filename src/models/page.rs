use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

string_enum! {
    /// PageStatus
    ///
    /// Static pages have no archive state.
    PageStatus("page status") {
        #[default]
        Draft => "draft",
        Published => "published",
    }
}

/// Page
///
/// A row of the `pages` table (about, contact, legal notices, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Page {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub language: String,
    #[sqlx(try_from = "String")]
    pub status: PageStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFilter {
    pub status: PageStatus,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageListQuery {
    /// `draft` or `published` (default).
    pub status: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPage {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub language: String,
    pub status: PageStatus,
}

#[derive(Debug, Clone)]
pub struct PageChanges {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub language: String,
    pub status: PageStatus,
}

/// CreatePageRequest
///
/// Input payload for `POST /pages`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePageRequest {
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(length(min = 3, max = 255, message = "Title must be 3-255 characters"))]
    pub title: String,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[serde(default, deserialize_with = "crate::validation::blank_as_none")]
    #[validate(length(min = 2, max = 10, message = "Invalid language code"))]
    pub language: Option<String>,
    #[serde(default)]
    pub status: Option<PageStatus>,
}

/// UpdatePageRequest
///
/// Partial update for `PUT /pages/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePageRequest {
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 3, max = 255, message = "Title must be 3-255 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::blank_as_none")]
    #[validate(length(min = 2, max = 10, message = "Invalid language code"))]
    pub language: Option<String>,
    #[serde(default)]
    pub status: Option<PageStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageListResponse {
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageResponse {
    pub page: Page,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageCreatedResponse {
    pub message: String,
    #[serde(rename = "pageId")]
    pub page_id: i32,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageUpdatedResponse {
    pub message: String,
    pub page: Page,
}
