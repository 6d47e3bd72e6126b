use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::{parse_id, resolve_slug, with_slug_retry};
use crate::{
    AppState,
    errors::{AppError, AppResult, ErrorBody},
    models::{
        CreatePageRequest, MessageResponse, NewPage, PageChanges, PageCreatedResponse, PageFilter,
        PageListQuery, PageListResponse, PageResponse, PageStatus, PageUpdatedResponse,
        UpdatePageRequest, non_blank,
    },
    slug::{SlugScope, slugify_or},
    validation::ValidatedJson,
};

fn page_not_found() -> AppError {
    AppError::not_found("Page not found")
}

/// list_pages
///
/// [Public Route] Pages in one status (default `published`), newest first.
#[utoipa::path(
    get,
    path = "/api/pages",
    params(PageListQuery),
    responses(
        (status = 200, description = "Pages", body = PageListResponse),
        (status = 400, description = "Unknown status", body = ErrorBody)
    )
)]
pub async fn list_pages(
    State(state): State<AppState>,
    Query(query): Query<PageListQuery>,
) -> AppResult<Json<PageListResponse>> {
    let status = match non_blank(query.status) {
        Some(raw) => raw
            .parse::<PageStatus>()
            .map_err(|e| AppError::bad_request(e.to_string()))?,
        None => PageStatus::Published,
    };
    let filter = PageFilter {
        status,
        language: non_blank(query.language),
    };

    let pages = state.repo.list_pages(&filter).await?;
    Ok(Json(PageListResponse { pages }))
}

/// get_page
///
/// [Public Route] Looks a page up by slug.
#[utoipa::path(
    get,
    path = "/api/pages/{id}",
    params(("id" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Page", body = PageResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<PageResponse>> {
    let page = state
        .repo
        .find_page_by_slug(&slug)
        .await?
        .ok_or_else(page_not_found)?;
    Ok(Json(PageResponse { page }))
}

/// create_page
///
/// [Editorial Route] Same slug policy as articles: a taken slug gets a
/// timestamp suffix.
#[utoipa::path(
    post,
    path = "/api/pages",
    request_body = CreatePageRequest,
    responses(
        (status = 201, description = "Created", body = PageCreatedResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 403, description = "Editors and admins only", body = ErrorBody)
    )
)]
pub async fn create_page(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePageRequest>,
) -> AppResult<(StatusCode, Json<PageCreatedResponse>)> {
    let base = slugify_or(&payload.title, "page");
    let slug = resolve_slug(state.repo.as_ref(), SlugScope::Pages, &base, None).await?;

    let draft = NewPage {
        title: payload.title,
        slug: String::new(),
        content: payload.content,
        language: payload.language.unwrap_or_else(|| "en".to_string()),
        status: payload.status.unwrap_or_default(),
    };

    let page = with_slug_retry(SlugScope::Pages, &base, slug, |slug| {
        state.repo.create_page(NewPage {
            slug,
            ..draft.clone()
        })
    })
    .await?;

    tracing::info!(page_id = page.id, slug = %page.slug, "page created");
    Ok((
        StatusCode::CREATED,
        Json(PageCreatedResponse {
            message: "Page created successfully".to_string(),
            page_id: page.id,
            page,
        }),
    ))
}

/// update_page
///
/// [Editorial Route] Partial update; a new title regenerates the slug.
#[utoipa::path(
    put,
    path = "/api/pages/{id}",
    params(("id" = i32, Path, description = "Page id")),
    request_body = UpdatePageRequest,
    responses(
        (status = 200, description = "Updated", body = PageUpdatedResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdatePageRequest>,
) -> AppResult<Json<PageUpdatedResponse>> {
    let id = parse_id(&id)?;
    let existing = state
        .repo
        .get_page(id)
        .await?
        .ok_or_else(page_not_found)?;

    let title = payload.title.unwrap_or_else(|| existing.title.clone());
    let base = slugify_or(&title, "page");
    let slug = if title != existing.title {
        resolve_slug(state.repo.as_ref(), SlugScope::Pages, &base, Some(id)).await?
    } else {
        existing.slug.clone()
    };

    let changes = PageChanges {
        title,
        slug: String::new(),
        content: payload.content.unwrap_or(existing.content),
        language: payload.language.unwrap_or(existing.language),
        status: payload.status.unwrap_or(existing.status),
    };

    let page = with_slug_retry(SlugScope::Pages, &base, slug, |slug| {
        state.repo.update_page(
            id,
            PageChanges {
                slug,
                ..changes.clone()
            },
        )
    })
    .await?
    .ok_or_else(page_not_found)?;

    tracing::info!(page_id = id, "page updated");
    Ok(Json(PageUpdatedResponse {
        message: "Page updated successfully".to_string(),
        page,
    }))
}

/// delete_page
///
/// [Editorial Route]
#[utoipa::path(
    delete,
    path = "/api/pages/{id}",
    params(("id" = i32, Path, description = "Page id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    if !state.repo.delete_page(id).await? {
        return Err(page_not_found());
    }

    tracing::info!(page_id = id, "page deleted");
    Ok(Json(MessageResponse::new("Page deleted successfully")))
}
