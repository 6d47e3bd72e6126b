use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::parse_id;
use crate::{
    AppState,
    errors::{AppError, AppResult, ErrorBody},
    models::{
        CategoryChanges, CategoryCreatedResponse, CategoryListResponse, CategoryResponse,
        CategoryUpdatedResponse, CreateCategoryRequest, MessageResponse, NewCategory, ResourceKey,
        UpdateCategoryRequest,
    },
    repository::{RepoError, Repository},
    slug::{SlugScope, bounded, slugify_or},
    validation::ValidatedJson,
};

fn category_not_found() -> AppError {
    AppError::not_found("Category not found")
}

fn name_taken() -> AppError {
    AppError::bad_request("Category with this name already exists")
}

fn category_slug(name: &str) -> String {
    bounded(&slugify_or(name, "category"), SlugScope::Categories.max_len())
}

/// Maps a slug race on write to the same 400 as the pre-check.
fn category_write_error(err: RepoError) -> AppError {
    match err {
        RepoError::UniqueViolation(_) => name_taken(),
        other => other.into(),
    }
}

async fn ensure_parent_exists(repo: &dyn Repository, parent_id: Option<i32>) -> AppResult<()> {
    if let Some(parent_id) = parent_id {
        if repo.find_category(&ResourceKey::Id(parent_id)).await?.is_none() {
            return Err(AppError::bad_request("Parent category not found"));
        }
    }
    Ok(())
}

/// list_categories
///
/// [Public Route] All categories ordered by name, each with the number of
/// published articles it holds.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Categories", body = CategoryListResponse))
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<CategoryListResponse>> {
    let categories = state.repo.list_categories().await?;
    Ok(Json(CategoryListResponse { categories }))
}

/// get_category
///
/// [Public Route] Numeric keys are ids, anything else a slug.
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category id or slug")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<CategoryResponse>> {
    let category = state
        .repo
        .find_category(&ResourceKey::parse(&key))
        .await?
        .ok_or_else(category_not_found)?;
    Ok(Json(CategoryResponse { category }))
}

/// create_category
///
/// [Editorial Route] Names must slug to something unused; there is no
/// suffixing for categories.
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Created", body = CategoryCreatedResponse),
        (status = 400, description = "Invalid or duplicate", body = ErrorBody),
        (status = 403, description = "Editors and admins only", body = ErrorBody)
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<CategoryCreatedResponse>)> {
    let slug = category_slug(&payload.name);
    if state
        .repo
        .slug_exists(SlugScope::Categories, &slug, None)
        .await?
    {
        return Err(name_taken());
    }
    ensure_parent_exists(state.repo.as_ref(), payload.parent_id).await?;

    let category = state
        .repo
        .create_category(NewCategory {
            name: payload.name,
            slug,
            description: payload.description,
            parent_id: payload.parent_id,
        })
        .await
        .map_err(category_write_error)?;

    tracing::info!(category_id = category.id, slug = %category.slug, "category created");
    Ok((
        StatusCode::CREATED,
        Json(CategoryCreatedResponse {
            message: "Category created successfully".to_string(),
            category_id: category.id,
            category,
        }),
    ))
}

/// update_category
///
/// [Editorial Route] Omitted fields keep their value; `description` and
/// `parent_id` may be cleared with an explicit `null`.
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated", body = CategoryUpdatedResponse),
        (status = 400, description = "Invalid, duplicate or self-parented", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> AppResult<Json<CategoryUpdatedResponse>> {
    let id = parse_id(&id)?;
    let existing = state
        .repo
        .find_category(&ResourceKey::Id(id))
        .await?
        .ok_or_else(category_not_found)?;

    let name = payload.name.unwrap_or_else(|| existing.name.clone());
    let slug = if name != existing.name {
        let slug = category_slug(&name);
        if state
            .repo
            .slug_exists(SlugScope::Categories, &slug, Some(id))
            .await?
        {
            return Err(name_taken());
        }
        slug
    } else {
        existing.slug.clone()
    };

    let parent_id = payload.parent_id.unwrap_or(existing.parent_id);
    if parent_id == Some(id) {
        return Err(AppError::bad_request("A category cannot be its own parent"));
    }
    ensure_parent_exists(state.repo.as_ref(), parent_id).await?;

    let category = state
        .repo
        .update_category(
            id,
            CategoryChanges {
                name,
                slug,
                description: payload.description.unwrap_or(existing.description),
                parent_id,
            },
        )
        .await
        .map_err(category_write_error)?
        .ok_or_else(category_not_found)?;

    tracing::info!(category_id = id, "category updated");
    Ok(Json(CategoryUpdatedResponse {
        message: "Category updated successfully".to_string(),
        category,
    }))
}

/// delete_category
///
/// [Editorial Route] Articles and child categories are detached, not deleted.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    if !state.repo.delete_category(id).await? {
        return Err(category_not_found());
    }

    tracing::info!(category_id = id, "category deleted");
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
