use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::parse_id;
use crate::{
    AppState,
    errors::{AppError, AppResult, ErrorBody},
    models::{
        CommentCreatedResponse, CommentListQuery, CommentListResponse, CommentStatus,
        CommentUpdatedResponse, CreateCommentRequest, MessageResponse, NewComment,
        UpdateCommentRequest, non_blank,
    },
    validation::ValidatedJson,
};

fn comment_not_found() -> AppError {
    AppError::not_found("Comment not found")
}

/// list_article_comments
///
/// [Public Route] Approved and still-pending comments of one article, newest first.
#[utoipa::path(
    get,
    path = "/api/comments/article/{article_id}",
    params(("article_id" = i32, Path, description = "Article id")),
    responses((status = 200, description = "Comments", body = CommentListResponse))
)]
pub async fn list_article_comments(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> AppResult<Json<CommentListResponse>> {
    let article_id = parse_id(&article_id)?;
    let comments = state.repo.list_article_comments(article_id).await?;
    Ok(Json(CommentListResponse { comments }))
}

/// create_comment
///
/// [Public Route] Visitor submission. Only published articles accept
/// comments, and every new comment waits in `pending`.
#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Submitted for review", body = CommentCreatedResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "Article missing or unpublished", body = ErrorBody)
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentCreatedResponse>)> {
    if !state
        .repo
        .published_article_exists(payload.article_id)
        .await?
    {
        return Err(AppError::not_found("Article not found"));
    }

    let comment = state
        .repo
        .create_comment(NewComment {
            article_id: payload.article_id,
            author_name: payload.author_name,
            author_email: payload.author_email,
            content: payload.content,
        })
        .await?;

    tracing::info!(comment_id = comment.id, article_id = comment.article_id, "comment submitted");
    Ok((
        StatusCode::CREATED,
        Json(CommentCreatedResponse {
            message: "Comment submitted successfully. It will be reviewed before being published."
                .to_string(),
            comment,
        }),
    ))
}

/// list_comments
///
/// [Editorial Route] Moderation queue, optionally narrowed to one status.
#[utoipa::path(
    get,
    path = "/api/comments",
    params(CommentListQuery),
    responses(
        (status = 200, description = "Comments with article titles", body = CommentListResponse),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 403, description = "Editors and admins only", body = ErrorBody)
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentListQuery>,
) -> AppResult<Json<CommentListResponse>> {
    let status = non_blank(query.status)
        .map(|raw| raw.parse::<CommentStatus>())
        .transpose()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let comments = state.repo.list_comments(status).await?;
    Ok(Json(CommentListResponse { comments }))
}

/// update_comment
///
/// [Editorial Route] Replaces the comment body; moderation state is untouched.
#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    params(("id" = i32, Path, description = "Comment id")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Updated", body = CommentUpdatedResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateCommentRequest>,
) -> AppResult<Json<CommentUpdatedResponse>> {
    let id = parse_id(&id)?;
    let comment = state
        .repo
        .update_comment_content(id, &payload.content)
        .await?
        .ok_or_else(comment_not_found)?;

    Ok(Json(CommentUpdatedResponse {
        message: "Comment updated successfully".to_string(),
        comment,
    }))
}

/// delete_comment
///
/// [Editorial Route]
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = i32, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    if !state.repo.delete_comment(id).await? {
        return Err(comment_not_found());
    }
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}

async fn moderate(
    state: &AppState,
    raw_id: &str,
    status: CommentStatus,
) -> AppResult<()> {
    let id = parse_id(raw_id)?;
    state
        .repo
        .set_comment_status(id, status)
        .await?
        .ok_or_else(comment_not_found)?;
    tracing::info!(comment_id = id, %status, "comment moderated");
    Ok(())
}

/// approve_comment
///
/// [Editorial Route] Marks a comment `approved`.
#[utoipa::path(
    patch,
    path = "/api/comments/{id}/approve",
    params(("id" = i32, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Approved", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn approve_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    moderate(&state, &id, CommentStatus::Approved).await?;
    Ok(Json(MessageResponse::new("Comment approved successfully")))
}

/// reject_comment
///
/// [Editorial Route] Marks a comment `spam`.
#[utoipa::path(
    patch,
    path = "/api/comments/{id}/reject",
    params(("id" = i32, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Rejected", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn reject_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    moderate(&state, &id, CommentStatus::Spam).await?;
    Ok(Json(MessageResponse::new("Comment rejected successfully")))
}
