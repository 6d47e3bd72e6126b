use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

use super::{parse_id, resolve_slug, with_slug_retry};
use crate::{
    AppState,
    auth::{ArticleAction, AuthUser, can_modify_article},
    errors::{AppError, AppResult, ErrorBody},
    models::{
        Article, ArticleChanges, ArticleCreatedResponse, ArticleFilter, ArticleListQuery,
        ArticleListResponse, ArticleResponse, ArticleStatus, ArticleUpdatedResponse,
        CreateArticleRequest, MessageResponse, NewArticle, ResourceKey, UpdateArticleRequest,
        non_blank,
    },
    pagination::Pagination,
    slug::{SlugScope, slugify_or},
    validation::ValidatedJson,
};

const DEFAULT_LANGUAGE: &str = "en";

fn article_not_found() -> AppError {
    AppError::not_found("Article not found")
}

/// list_articles
///
/// [Public Route] Paginated article listing. `status` defaults to `published`;
/// `category` is a category slug; `search` matches title or content.
#[utoipa::path(
    get,
    path = "/api/articles",
    params(ArticleListQuery),
    responses(
        (status = 200, description = "One page of articles", body = ArticleListResponse),
        (status = 400, description = "Unknown status", body = ErrorBody)
    )
)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticleListQuery>,
) -> AppResult<Json<ArticleListResponse>> {
    let status = match non_blank(query.status) {
        Some(raw) => raw
            .parse::<ArticleStatus>()
            .map_err(|e| AppError::bad_request(e.to_string()))?,
        None => ArticleStatus::Published,
    };

    let filter = ArticleFilter {
        status,
        category: non_blank(query.category),
        language: non_blank(query.language),
        search: non_blank(query.search),
    };
    let page = Pagination::from_query(query.page.as_deref(), query.limit.as_deref());

    let articles = state.repo.list_articles(&filter, page).await?;
    let total = state.repo.count_articles(&filter).await?;

    Ok(Json(ArticleListResponse {
        articles,
        pagination: page.page_info(total),
    }))
}

/// get_article
///
/// [Public Route] Fetches one article by numeric id or slug and counts the view.
/// The returned `views` already includes this request.
#[utoipa::path(
    get,
    path = "/api/articles/{id}",
    params(("id" = String, Path, description = "Article id or slug")),
    responses(
        (status = 200, description = "Article", body = ArticleResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<ArticleResponse>> {
    let mut article = state
        .repo
        .find_article(&ResourceKey::parse(&key))
        .await?
        .ok_or_else(article_not_found)?;

    // deleted between the read and the bump: report what we read
    if let Some(views) = state.repo.increment_article_views(article.id).await? {
        article.views = views;
    }

    Ok(Json(ArticleResponse { article }))
}

/// create_article
///
/// [Authenticated Route] Creates an article authored by the caller. Publishing
/// on creation stamps `published_at`.
#[utoipa::path(
    post,
    path = "/api/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Created", body = ArticleCreatedResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn create_article(
    user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateArticleRequest>,
) -> AppResult<(StatusCode, Json<ArticleCreatedResponse>)> {
    let base = slugify_or(&payload.title, "article");
    let slug = resolve_slug(state.repo.as_ref(), SlugScope::Articles, &base, None).await?;

    let status = payload.status.unwrap_or_default();
    let draft = NewArticle {
        title: payload.title,
        slug: String::new(),
        content: payload.content,
        excerpt: payload.excerpt,
        featured_image: payload.featured_image,
        category_id: payload.category_id,
        author_id: user.id,
        language: payload
            .language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        status,
        published_at: status.published_at(None, Utc::now()),
    };

    let article = with_slug_retry(SlugScope::Articles, &base, slug, |slug| {
        state.repo.create_article(NewArticle {
            slug,
            ..draft.clone()
        })
    })
    .await?;

    tracing::info!(article_id = article.id, author_id = user.id, slug = %article.slug, "article created");
    Ok((
        StatusCode::CREATED,
        Json(ArticleCreatedResponse {
            message: "Article created successfully".to_string(),
            article_id: article.id,
            article,
        }),
    ))
}

/// update_article
///
/// [Authenticated Route] Partial update. Authors may only edit their own
/// articles; editors and admins may edit any. A changed title regenerates the slug.
#[utoipa::path(
    put,
    path = "/api/articles/{id}",
    params(("id" = i32, Path, description = "Article id")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Updated", body = ArticleUpdatedResponse),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update_article(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateArticleRequest>,
) -> AppResult<Json<ArticleUpdatedResponse>> {
    let id = parse_id(&id)?;
    let existing = state
        .repo
        .find_article(&ResourceKey::Id(id))
        .await?
        .ok_or_else(article_not_found)?;

    if !can_modify_article(&user, existing.author_id, ArticleAction::Update) {
        return Err(AppError::forbidden());
    }

    let title = payload.title.unwrap_or_else(|| existing.title.clone());
    let base = slugify_or(&title, "article");
    let slug = if title != existing.title {
        resolve_slug(state.repo.as_ref(), SlugScope::Articles, &base, Some(id)).await?
    } else {
        existing.slug.clone()
    };

    let status = payload.status.unwrap_or(existing.status);
    let changes = ArticleChanges {
        title,
        slug: String::new(),
        content: payload.content.unwrap_or(existing.content),
        excerpt: payload.excerpt.or(existing.excerpt),
        featured_image: payload.featured_image.or(existing.featured_image),
        category_id: payload.category_id.or(existing.category_id),
        language: payload.language.unwrap_or(existing.language),
        status,
        publish_at: status.published_at(None, Utc::now()),
    };

    let article = with_slug_retry(SlugScope::Articles, &base, slug, |slug| {
        state.repo.update_article(
            id,
            ArticleChanges {
                slug,
                ..changes.clone()
            },
        )
    })
    .await?
    .ok_or_else(article_not_found)?;

    tracing::info!(article_id = id, user_id = user.id, status = %article.status, "article updated");
    Ok(Json(ArticleUpdatedResponse {
        message: "Article updated successfully".to_string(),
        article,
    }))
}

/// delete_article
///
/// [Authenticated Route] Admins may delete any article, everyone else only
/// their own. Comments go with it.
#[utoipa::path(
    delete,
    path = "/api/articles/{id}",
    params(("id" = i32, Path, description = "Article id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn delete_article(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    let existing: Article = state
        .repo
        .find_article(&ResourceKey::Id(id))
        .await?
        .ok_or_else(article_not_found)?;

    if !can_modify_article(&user, existing.author_id, ArticleAction::Delete) {
        return Err(AppError::forbidden());
    }

    if !state.repo.delete_article(id).await? {
        return Err(article_not_found());
    }

    tracing::info!(article_id = id, user_id = user.id, "article deleted");
    Ok(Json(MessageResponse::new("Article deleted successfully")))
}
