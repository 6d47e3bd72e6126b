use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{RepoError, RepoResult, Repository};
use crate::{
    models::{
        Article, ArticleChanges, ArticleFilter, ArticleStatus, Category, CategoryChanges,
        Comment, CommentStatus, NewArticle, NewCategory, NewComment, NewPage, NewUser, Page,
        PageChanges, PageFilter, ResourceKey, User,
    },
    pagination::Pagination,
    slug::SlugScope,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    articles: Vec<Article>,
    categories: Vec<Category>,
    pages: Vec<Page>,
    comments: Vec<Comment>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn slug_taken(&self, scope: SlugScope, slug: &str, exclude: Option<i32>) -> bool {
        let other = |id: i32| Some(id) != exclude;
        match scope {
            SlugScope::Articles => self.articles.iter().any(|a| a.slug == slug && other(a.id)),
            SlugScope::Categories => self.categories.iter().any(|c| c.slug == slug && other(c.id)),
            SlugScope::Pages => self.pages.iter().any(|p| p.slug == slug && other(p.id)),
        }
    }

    fn check_category_ref(&self, category_id: Option<i32>, constraint: &str) -> RepoResult<()> {
        match category_id {
            Some(id) if !self.categories.iter().any(|c| c.id == id) => {
                Err(RepoError::ForeignKeyViolation(constraint.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Adds the joined columns the SQL read queries produce.
    fn joined(&self, article: &Article) -> Article {
        let mut article = article.clone();
        article.category_name = article
            .category_id
            .and_then(|id| self.categories.iter().find(|c| c.id == id))
            .map(|c| c.name.clone());
        article.author_name = self
            .users
            .iter()
            .find(|u| u.id == article.author_id)
            .map(|u| u.username.clone());
        article
    }

    fn matches(&self, article: &Article, filter: &ArticleFilter) -> bool {
        if article.status != filter.status {
            return false;
        }
        if let Some(slug) = &filter.category {
            let in_category = article
                .category_id
                .and_then(|id| self.categories.iter().find(|c| c.id == id))
                .is_some_and(|c| &c.slug == slug);
            if !in_category {
                return false;
            }
        }
        if let Some(language) = &filter.language {
            if &article.language != language {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            if !article.title.to_lowercase().contains(&needle)
                && !article.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// MemoryRepository
///
/// In-process [`Repository`] with the same constraint, cascade and ordering
/// behaviour as the Postgres schema. Used by the test suites and for running
/// the API without a database.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Newest first; ids break ties between rows created in the same instant.
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i32)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_exists(&self, email: &str, username: &str) -> RepoResult<bool> {
        Ok(self
            .tables()
            .users
            .iter()
            .any(|u| u.email == email || u.username == username))
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut t = self.tables();
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::UniqueViolation("users_email_key".to_string()));
        }
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::UniqueViolation("users_username_key".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: t.next_id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        t.users.push(created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: i32) -> RepoResult<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        page: Pagination,
    ) -> RepoResult<Vec<Article>> {
        let t = self.tables();
        let mut rows: Vec<Article> = t
            .articles
            .iter()
            .filter(|a| t.matches(a, filter))
            .map(|a| t.joined(a))
            .collect();
        newest_first(&mut rows, |a| (a.created_at, a.id));

        Ok(rows
            .into_iter()
            .skip(page.offset().max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect())
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> RepoResult<i64> {
        let t = self.tables();
        Ok(t.articles.iter().filter(|a| t.matches(a, filter)).count() as i64)
    }

    async fn find_article(&self, key: &ResourceKey) -> RepoResult<Option<Article>> {
        let t = self.tables();
        let found = t.articles.iter().find(|a| match key {
            ResourceKey::Id(id) => a.id == *id,
            ResourceKey::Slug(slug) => &a.slug == slug,
        });
        Ok(found.map(|a| t.joined(a)))
    }

    async fn increment_article_views(&self, id: i32) -> RepoResult<Option<i32>> {
        let mut t = self.tables();
        Ok(t.articles.iter_mut().find(|a| a.id == id).map(|a| {
            a.views += 1;
            a.views
        }))
    }

    async fn create_article(&self, article: NewArticle) -> RepoResult<Article> {
        let mut t = self.tables();
        if t.slug_taken(SlugScope::Articles, &article.slug, None) {
            return Err(RepoError::UniqueViolation("articles_slug_key".to_string()));
        }
        t.check_category_ref(article.category_id, "articles_category_id_fkey")?;
        if !t.users.iter().any(|u| u.id == article.author_id) {
            return Err(RepoError::ForeignKeyViolation(
                "articles_author_id_fkey".to_string(),
            ));
        }

        let now = Utc::now();
        let created = Article {
            id: t.next_id(),
            title: article.title,
            slug: article.slug,
            content: article.content,
            excerpt: article.excerpt,
            featured_image: article.featured_image,
            category_id: article.category_id,
            author_id: article.author_id,
            language: article.language,
            status: article.status,
            views: 0,
            created_at: now,
            updated_at: now,
            published_at: article.published_at,
            category_name: None,
            author_name: None,
        };
        t.articles.push(created.clone());
        Ok(created)
    }

    async fn update_article(
        &self,
        id: i32,
        changes: ArticleChanges,
    ) -> RepoResult<Option<Article>> {
        let mut t = self.tables();
        if !t.articles.iter().any(|a| a.id == id) {
            return Ok(None);
        }
        if t.slug_taken(SlugScope::Articles, &changes.slug, Some(id)) {
            return Err(RepoError::UniqueViolation("articles_slug_key".to_string()));
        }
        t.check_category_ref(changes.category_id, "articles_category_id_fkey")?;

        let Some(article) = t.articles.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        article.title = changes.title;
        article.slug = changes.slug;
        article.content = changes.content;
        article.excerpt = changes.excerpt;
        article.featured_image = changes.featured_image;
        article.category_id = changes.category_id;
        article.language = changes.language;
        article.status = changes.status;
        article.published_at = article.published_at.or(changes.publish_at);
        article.updated_at = Utc::now();
        Ok(Some(article.clone()))
    }

    async fn delete_article(&self, id: i32) -> RepoResult<bool> {
        let mut t = self.tables();
        let before = t.articles.len();
        t.articles.retain(|a| a.id != id);
        if t.articles.len() == before {
            return Ok(false);
        }
        t.comments.retain(|c| c.article_id != id);
        Ok(true)
    }

    async fn slug_exists(
        &self,
        scope: SlugScope,
        slug: &str,
        exclude: Option<i32>,
    ) -> RepoResult<bool> {
        Ok(self.tables().slug_taken(scope, slug, exclude))
    }

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let t = self.tables();
        let mut rows: Vec<Category> = t
            .categories
            .iter()
            .map(|c| {
                let published = t
                    .articles
                    .iter()
                    .filter(|a| a.category_id == Some(c.id) && a.status == ArticleStatus::Published)
                    .count();
                Category {
                    article_count: Some(published as i64),
                    ..c.clone()
                }
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_category(&self, key: &ResourceKey) -> RepoResult<Option<Category>> {
        Ok(self
            .tables()
            .categories
            .iter()
            .find(|c| match key {
                ResourceKey::Id(id) => c.id == *id,
                ResourceKey::Slug(slug) => &c.slug == slug,
            })
            .cloned())
    }

    async fn create_category(&self, category: NewCategory) -> RepoResult<Category> {
        let mut t = self.tables();
        if t.slug_taken(SlugScope::Categories, &category.slug, None) {
            return Err(RepoError::UniqueViolation("categories_slug_key".to_string()));
        }
        t.check_category_ref(category.parent_id, "categories_parent_id_fkey")?;

        let now = Utc::now();
        let created = Category {
            id: t.next_id(),
            name: category.name,
            slug: category.slug,
            description: category.description,
            parent_id: category.parent_id,
            created_at: now,
            updated_at: now,
            article_count: None,
        };
        t.categories.push(created.clone());
        Ok(created)
    }

    async fn update_category(
        &self,
        id: i32,
        changes: CategoryChanges,
    ) -> RepoResult<Option<Category>> {
        let mut t = self.tables();
        if !t.categories.iter().any(|c| c.id == id) {
            return Ok(None);
        }
        if t.slug_taken(SlugScope::Categories, &changes.slug, Some(id)) {
            return Err(RepoError::UniqueViolation("categories_slug_key".to_string()));
        }
        t.check_category_ref(changes.parent_id, "categories_parent_id_fkey")?;

        let Some(category) = t.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        category.name = changes.name;
        category.slug = changes.slug;
        category.description = changes.description;
        category.parent_id = changes.parent_id;
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i32) -> RepoResult<bool> {
        let mut t = self.tables();
        let before = t.categories.len();
        t.categories.retain(|c| c.id != id);
        if t.categories.len() == before {
            return Ok(false);
        }
        // ON DELETE SET NULL
        for article in t.articles.iter_mut().filter(|a| a.category_id == Some(id)) {
            article.category_id = None;
        }
        for child in t.categories.iter_mut().filter(|c| c.parent_id == Some(id)) {
            child.parent_id = None;
        }
        Ok(true)
    }

    async fn list_pages(&self, filter: &PageFilter) -> RepoResult<Vec<Page>> {
        let t = self.tables();
        let mut rows: Vec<Page> = t
            .pages
            .iter()
            .filter(|p| p.status == filter.status)
            .filter(|p| filter.language.as_ref().is_none_or(|l| &p.language == l))
            .cloned()
            .collect();
        newest_first(&mut rows, |p| (p.created_at, p.id));
        Ok(rows)
    }

    async fn find_page_by_slug(&self, slug: &str) -> RepoResult<Option<Page>> {
        Ok(self.tables().pages.iter().find(|p| p.slug == slug).cloned())
    }

    async fn get_page(&self, id: i32) -> RepoResult<Option<Page>> {
        Ok(self.tables().pages.iter().find(|p| p.id == id).cloned())
    }

    async fn create_page(&self, page: NewPage) -> RepoResult<Page> {
        let mut t = self.tables();
        if t.slug_taken(SlugScope::Pages, &page.slug, None) {
            return Err(RepoError::UniqueViolation("pages_slug_key".to_string()));
        }

        let now = Utc::now();
        let created = Page {
            id: t.next_id(),
            title: page.title,
            slug: page.slug,
            content: page.content,
            language: page.language,
            status: page.status,
            created_at: now,
            updated_at: now,
        };
        t.pages.push(created.clone());
        Ok(created)
    }

    async fn update_page(&self, id: i32, changes: PageChanges) -> RepoResult<Option<Page>> {
        let mut t = self.tables();
        if t.slug_taken(SlugScope::Pages, &changes.slug, Some(id)) {
            return Err(RepoError::UniqueViolation("pages_slug_key".to_string()));
        }

        let Some(page) = t.pages.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        page.title = changes.title;
        page.slug = changes.slug;
        page.content = changes.content;
        page.language = changes.language;
        page.status = changes.status;
        page.updated_at = Utc::now();
        Ok(Some(page.clone()))
    }

    async fn delete_page(&self, id: i32) -> RepoResult<bool> {
        let mut t = self.tables();
        let before = t.pages.len();
        t.pages.retain(|p| p.id != id);
        Ok(t.pages.len() != before)
    }

    async fn list_article_comments(&self, article_id: i32) -> RepoResult<Vec<Comment>> {
        let mut rows: Vec<Comment> = self
            .tables()
            .comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .filter(|c| matches!(c.status, CommentStatus::Approved | CommentStatus::Pending))
            .cloned()
            .collect();
        newest_first(&mut rows, |c| (c.created_at, c.id));
        Ok(rows)
    }

    async fn list_comments(&self, status: Option<CommentStatus>) -> RepoResult<Vec<Comment>> {
        let t = self.tables();
        let mut rows: Vec<Comment> = t
            .comments
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .map(|c| Comment {
                article_title: t
                    .articles
                    .iter()
                    .find(|a| a.id == c.article_id)
                    .map(|a| a.title.clone()),
                ..c.clone()
            })
            .collect();
        newest_first(&mut rows, |c| (c.created_at, c.id));
        Ok(rows)
    }

    async fn published_article_exists(&self, id: i32) -> RepoResult<bool> {
        Ok(self
            .tables()
            .articles
            .iter()
            .any(|a| a.id == id && a.status == ArticleStatus::Published))
    }

    async fn create_comment(&self, comment: NewComment) -> RepoResult<Comment> {
        let mut t = self.tables();
        if !t.articles.iter().any(|a| a.id == comment.article_id) {
            return Err(RepoError::ForeignKeyViolation(
                "comments_article_id_fkey".to_string(),
            ));
        }

        let created = Comment {
            id: t.next_id(),
            article_id: comment.article_id,
            author_name: comment.author_name,
            author_email: comment.author_email,
            content: comment.content,
            status: CommentStatus::Pending,
            created_at: Utc::now(),
            article_title: None,
        };
        t.comments.push(created.clone());
        Ok(created)
    }

    async fn update_comment_content(
        &self,
        id: i32,
        content: &str,
    ) -> RepoResult<Option<Comment>> {
        let mut t = self.tables();
        Ok(t.comments.iter_mut().find(|c| c.id == id).map(|c| {
            c.content = content.to_string();
            c.clone()
        }))
    }

    async fn set_comment_status(
        &self,
        id: i32,
        status: CommentStatus,
    ) -> RepoResult<Option<Comment>> {
        let mut t = self.tables();
        Ok(t.comments.iter_mut().find(|c| c.id == id).map(|c| {
            c.status = status;
            c.clone()
        }))
    }

    async fn delete_comment(&self, id: i32) -> RepoResult<bool> {
        let mut t = self.tables();
        let before = t.comments.len();
        t.comments.retain(|c| c.id != id);
        Ok(t.comments.len() != before)
    }
}
