use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// Category
///
/// A row of the `categories` table. `article_count` is the number of published
/// articles in the category and is only filled in by the listing query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | undefined")]
    pub article_count: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct CategoryChanges {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
}

/// CreateCategoryRequest
///
/// Input payload for `POST /categories`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCategoryRequest {
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,
    #[serde(default, deserialize_with = "crate::validation::blank_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i32>,
}

/// UpdateCategoryRequest
///
/// Partial update for `PUT /categories/{id}`. `description` and `parent_id`
/// accept an explicit `null` to clear the stored value; leaving them out keeps it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCategoryRequest {
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::double_option")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::validation::double_option")]
    #[schema(value_type = Option<i32>)]
    #[ts(type = "number | null")]
    pub parent_id: Option<Option<i32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryResponse {
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryCreatedResponse {
    pub message: String,
    #[serde(rename = "categoryId")]
    pub category_id: i32,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryUpdatedResponse {
    pub message: String,
    pub category: Category,
}
