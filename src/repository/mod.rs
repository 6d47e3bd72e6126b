use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    models::{
        Article, ArticleChanges, ArticleFilter, Category, CategoryChanges, Comment,
        CommentStatus, NewArticle, NewCategory, NewComment, NewPage, NewUser, Page, PageChanges,
        PageFilter, ResourceKey, User,
    },
    pagination::Pagination,
    slug::SlugScope,
};

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Constraint violations are split out so handlers can answer 400 instead of 500.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl RepoError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, RepoError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or_default().to_string();
            if db.is_unique_violation() {
                return RepoError::UniqueViolation(constraint);
            }
            if db.is_foreign_key_violation() {
                return RepoError::ForeignKeyViolation(constraint);
            }
        }
        RepoError::Database(err)
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository
///
/// Persistence contract used by every handler. `PostgresRepository` is the
/// production implementation; `MemoryRepository` mirrors its semantics
/// (constraints, cascades, ordering) in process.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// True when either the email or the username is already taken.
    async fn user_exists(&self, email: &str, username: &str) -> RepoResult<bool>;
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    async fn get_user(&self, id: i32) -> RepoResult<Option<User>>;

    // --- Articles ---
    /// One page of articles matching `filter`, newest first, with joined names.
    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        page: Pagination,
    ) -> RepoResult<Vec<Article>>;
    /// Count under the exact predicates of `list_articles`.
    async fn count_articles(&self, filter: &ArticleFilter) -> RepoResult<i64>;
    async fn find_article(&self, key: &ResourceKey) -> RepoResult<Option<Article>>;
    /// Bumps `views` by one and returns the new value.
    async fn increment_article_views(&self, id: i32) -> RepoResult<Option<i32>>;
    async fn create_article(&self, article: NewArticle) -> RepoResult<Article>;
    async fn update_article(&self, id: i32, changes: ArticleChanges)
    -> RepoResult<Option<Article>>;
    async fn delete_article(&self, id: i32) -> RepoResult<bool>;

    /// Whether `slug` is used in `scope`, ignoring the row `exclude`.
    async fn slug_exists(
        &self,
        scope: SlugScope,
        slug: &str,
        exclude: Option<i32>,
    ) -> RepoResult<bool>;

    // --- Categories ---
    /// All categories by name, with their published article count.
    async fn list_categories(&self) -> RepoResult<Vec<Category>>;
    async fn find_category(&self, key: &ResourceKey) -> RepoResult<Option<Category>>;
    async fn create_category(&self, category: NewCategory) -> RepoResult<Category>;
    async fn update_category(
        &self,
        id: i32,
        changes: CategoryChanges,
    ) -> RepoResult<Option<Category>>;
    async fn delete_category(&self, id: i32) -> RepoResult<bool>;

    // --- Pages ---
    async fn list_pages(&self, filter: &PageFilter) -> RepoResult<Vec<Page>>;
    async fn find_page_by_slug(&self, slug: &str) -> RepoResult<Option<Page>>;
    async fn get_page(&self, id: i32) -> RepoResult<Option<Page>>;
    async fn create_page(&self, page: NewPage) -> RepoResult<Page>;
    async fn update_page(&self, id: i32, changes: PageChanges) -> RepoResult<Option<Page>>;
    async fn delete_page(&self, id: i32) -> RepoResult<bool>;

    // --- Comments ---
    /// Approved and pending comments of one article, newest first.
    async fn list_article_comments(&self, article_id: i32) -> RepoResult<Vec<Comment>>;
    /// Moderation queue with the article title joined in, newest first.
    async fn list_comments(&self, status: Option<CommentStatus>) -> RepoResult<Vec<Comment>>;
    async fn published_article_exists(&self, id: i32) -> RepoResult<bool>;
    async fn create_comment(&self, comment: NewComment) -> RepoResult<Comment>;
    async fn update_comment_content(&self, id: i32, content: &str)
    -> RepoResult<Option<Comment>>;
    async fn set_comment_status(
        &self,
        id: i32,
        status: CommentStatus,
    ) -> RepoResult<Option<Comment>>;
    async fn delete_comment(&self, id: i32) -> RepoResult<bool>;
}

/// RepositoryState
///
/// Shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
