use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

string_enum! {
    /// CommentStatus
    ///
    /// Moderation state. Visitors submit `pending` comments; staff move them to
    /// `approved` or `spam`.
    CommentStatus("comment status") {
        #[default]
        Pending => "pending",
        Approved => "approved",
        Spam => "spam",
    }
}

/// Comment
///
/// A row of the `comments` table. Commenters are free-text visitors, not
/// accounts. `article_title` is joined in by the moderation listing only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: i32,
    pub article_id: i32,
    pub author_name: String,
    pub author_email: Option<String>,
    pub content: String,
    #[sqlx(try_from = "String")]
    pub status: CommentStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | undefined")]
    pub article_title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub article_id: i32,
    pub author_name: String,
    pub author_email: Option<String>,
    pub content: String,
}

/// CreateCommentRequest
///
/// Input payload for the public `POST /comments`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    #[validate(range(min = 1, message = "Valid article ID required"))]
    pub article_id: i32,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(length(min = 1, max = 100, message = "Author name must be 1-100 characters"))]
    pub author_name: String,
    #[serde(default, deserialize_with = "crate::validation::blank_as_none")]
    #[validate(
        email(message = "Valid email required"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub author_email: Option<String>,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub content: String,
}

/// UpdateCommentRequest
///
/// Staff edit of a comment body (`PUT /comments/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCommentRequest {
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommentListQuery {
    /// `pending`, `approved` or `spam`; omit for all.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentCreatedResponse {
    pub message: String,
    pub comment: Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentUpdatedResponse {
    pub message: String,
    pub comment: Comment,
}
