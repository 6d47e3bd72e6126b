use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{RepoResult, Repository};
use crate::{
    models::{
        Article, ArticleChanges, ArticleFilter, Category, CategoryChanges, Comment,
        CommentStatus, NewArticle, NewCategory, NewComment, NewPage, NewUser, Page, PageChanges,
        PageFilter, ResourceKey, User,
    },
    pagination::Pagination,
    slug::SlugScope,
};

const ARTICLE_SELECT: &str = r#"
    SELECT a.*, c.name AS category_name, u.username AS author_name
    FROM articles a
    LEFT JOIN categories c ON a.category_id = c.id
    LEFT JOIN users u ON a.author_id = u.id
"#;

const CATEGORY_SELECT: &str = r#"
    SELECT c.*,
           COUNT(a.id) FILTER (WHERE a.status = 'published') AS article_count
    FROM categories c
    LEFT JOIN articles a ON a.category_id = c.id
"#;

/// PostgresRepository
///
/// sqlx implementation of [`Repository`]. All user input goes through bind
/// parameters; dynamic filters are assembled with `QueryBuilder`.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the WHERE clause shared by the article list and count queries.
fn push_article_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
    builder.push(" WHERE a.status = ");
    builder.push_bind(filter.status.as_str().to_string());

    if let Some(category) = &filter.category {
        builder.push(" AND a.category_id IN (SELECT id FROM categories WHERE slug = ");
        builder.push_bind(category.clone());
        builder.push(")");
    }

    if let Some(language) = &filter.language {
        builder.push(" AND a.language = ");
        builder.push_bind(language.clone());
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        builder.push(" AND (a.title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR a.content ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_exists(&self, email: &str, username: &str) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR username = $2)",
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn get_user(&self, id: i32) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        page: Pagination,
    ) -> RepoResult<Vec<Article>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(ARTICLE_SELECT);
        push_article_filters(&mut builder, filter);
        builder.push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let articles = builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "list_articles failed"))?;
        Ok(articles)
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> RepoResult<i64> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM articles a");
        push_article_filters(&mut builder, filter);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn find_article(&self, key: &ResourceKey) -> RepoResult<Option<Article>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(ARTICLE_SELECT);
        match key {
            ResourceKey::Id(id) => {
                builder.push(" WHERE a.id = ");
                builder.push_bind(*id);
            }
            ResourceKey::Slug(slug) => {
                builder.push(" WHERE a.slug = ");
                builder.push_bind(slug.clone());
            }
        }

        let article = builder
            .build_query_as::<Article>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    async fn increment_article_views(&self, id: i32) -> RepoResult<Option<i32>> {
        let views = sqlx::query_scalar::<_, i32>(
            "UPDATE articles SET views = views + 1 WHERE id = $1 RETURNING views",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(views)
    }

    async fn create_article(&self, article: NewArticle) -> RepoResult<Article> {
        let created = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles
                (title, slug, content, excerpt, featured_image, category_id,
                 author_id, language, status, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.content)
        .bind(&article.excerpt)
        .bind(&article.featured_image)
        .bind(article.category_id)
        .bind(article.author_id)
        .bind(&article.language)
        .bind(article.status.as_str())
        .bind(article.published_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_article(
        &self,
        id: i32,
        changes: ArticleChanges,
    ) -> RepoResult<Option<Article>> {
        // published_at is written once: COALESCE keeps an existing timestamp
        let updated = sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET title = $1, slug = $2, content = $3, excerpt = $4,
                featured_image = $5, category_id = $6, language = $7,
                status = $8, published_at = COALESCE(published_at, $9),
                updated_at = NOW()
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.content)
        .bind(&changes.excerpt)
        .bind(&changes.featured_image)
        .bind(changes.category_id)
        .bind(&changes.language)
        .bind(changes.status.as_str())
        .bind(changes.publish_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_article(&self, id: i32) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn slug_exists(
        &self,
        scope: SlugScope,
        slug: &str,
        exclude: Option<i32>,
    ) -> RepoResult<bool> {
        // table name comes from a closed enum, never from input
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM ");
        builder.push(scope.table());
        builder.push(" WHERE slug = ");
        builder.push_bind(slug.to_string());
        if let Some(id) = exclude {
            builder.push(" AND id <> ");
            builder.push_bind(id);
        }
        builder.push(")");

        let exists = builder
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(CATEGORY_SELECT);
        builder.push(" GROUP BY c.id ORDER BY c.name");

        let categories = builder
            .build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn find_category(&self, key: &ResourceKey) -> RepoResult<Option<Category>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM categories");
        match key {
            ResourceKey::Id(id) => {
                builder.push(" WHERE id = ");
                builder.push_bind(*id);
            }
            ResourceKey::Slug(slug) => {
                builder.push(" WHERE slug = ");
                builder.push_bind(slug.clone());
            }
        }

        let category = builder
            .build_query_as::<Category>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn create_category(&self, category: NewCategory) -> RepoResult<Category> {
        let created = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.parent_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_category(
        &self,
        id: i32,
        changes: CategoryChanges,
    ) -> RepoResult<Option<Category>> {
        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, slug = $2, description = $3, parent_id = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.slug)
        .bind(&changes.description)
        .bind(changes.parent_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_category(&self, id: i32) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pages(&self, filter: &PageFilter) -> RepoResult<Vec<Page>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM pages WHERE status = ");
        builder.push_bind(filter.status.as_str().to_string());
        if let Some(language) = &filter.language {
            builder.push(" AND language = ");
            builder.push_bind(language.clone());
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        let pages = builder
            .build_query_as::<Page>()
            .fetch_all(&self.pool)
            .await?;
        Ok(pages)
    }

    async fn find_page_by_slug(&self, slug: &str) -> RepoResult<Option<Page>> {
        let page = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    async fn get_page(&self, id: i32) -> RepoResult<Option<Page>> {
        let page = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    async fn create_page(&self, page: NewPage) -> RepoResult<Page> {
        let created = sqlx::query_as::<_, Page>(
            r#"
            INSERT INTO pages (title, slug, content, language, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&page.title)
        .bind(&page.slug)
        .bind(&page.content)
        .bind(&page.language)
        .bind(page.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_page(&self, id: i32, changes: PageChanges) -> RepoResult<Option<Page>> {
        let updated = sqlx::query_as::<_, Page>(
            r#"
            UPDATE pages
            SET title = $1, slug = $2, content = $3, language = $4, status = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.content)
        .bind(&changes.language)
        .bind(changes.status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_page(&self, id: i32) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_article_comments(&self, article_id: i32) -> RepoResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            WHERE article_id = $1 AND status IN ('approved', 'pending')
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn list_comments(&self, status: Option<CommentStatus>) -> RepoResult<Vec<Comment>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT c.*, a.title AS article_title
            FROM comments c
            LEFT JOIN articles a ON c.article_id = a.id
            "#,
        );
        if let Some(status) = status {
            builder.push(" WHERE c.status = ");
            builder.push_bind(status.as_str().to_string());
        }
        builder.push(" ORDER BY c.created_at DESC, c.id DESC");

        let comments = builder
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn published_article_exists(&self, id: i32) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM articles WHERE id = $1 AND status = 'published')",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_comment(&self, comment: NewComment) -> RepoResult<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (article_id, author_name, author_email, content, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING *
            "#,
        )
        .bind(comment.article_id)
        .bind(&comment.author_name)
        .bind(&comment.author_email)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_comment_content(
        &self,
        id: i32,
        content: &str,
    ) -> RepoResult<Option<Comment>> {
        let updated = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $1 WHERE id = $2 RETURNING *",
        )
        .bind(content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn set_comment_status(
        &self,
        id: i32,
        status: CommentStatus,
    ) -> RepoResult<Option<Comment>> {
        let updated = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET status = $1 WHERE id = $2 RETURNING *",
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_comment(&self, id: i32) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
