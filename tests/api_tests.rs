use cms_backend::{
    AppConfig, AppState, MemoryRepository, create_router,
    config::AdminSeed,
    repository::RepositoryState,
    seed::seed_admin,
};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "admin-password";

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.client.get(self.url(path)).send().await.expect("req fail");
        read(response).await
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        read(request.send().await.expect("req fail")).await
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, token, Some(body)).await
    }

    async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::PUT, path, Some(token), Some(body))
            .await
    }

    async fn patch(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(reqwest::Method::PATCH, path, Some(token), None).await
    }

    async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(reqwest::Method::DELETE, path, Some(token), None)
            .await
    }

    /// Registers an author and returns its token.
    async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "secret123"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    async fn create_article(&self, token: &str, body: Value) -> Value {
        let (status, body) = self.post("/api/articles", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["article"].clone()
    }
}

async fn read(response: reqwest::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    let config = AppConfig::default();

    let seed = AdminSeed {
        email: ADMIN_EMAIL.to_string(),
        username: "admin".to_string(),
        password: ADMIN_PASSWORD.to_string(),
    };
    assert!(seed_admin(repo.as_ref(), &seed).await.unwrap());

    let router = create_router(AppState { repo, config });

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        client: Client::new(),
    }
}

// --- System ---

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "CMS API is running");
}

#[tokio::test]
async fn test_index_and_unknown_route() {
    let app = spawn_app().await;

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "CMS Backend API");
    assert_eq!(body["endpoints"]["articles"], "/api/articles");

    let (status, body) = app.get("/api/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/api/health")).send().await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

// --- Auth ---

#[tokio::test]
async fn test_register_login_profile() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "alice", "email": "alice@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["role"], "author");
    assert!(body["user"].get("password").is_none());

    // same email again
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "alice2", "email": "alice@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "alice@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let token = app.login("alice@example.com", "secret123").await;
    let (status, body) = app
        .send(reqwest::Method::GET, "/api/auth/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"]["created_at"].is_string());
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = spawn_app().await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "ab", "email": "not-an-email", "password": "123" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["email", "password", "username"]);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    let (status, body) = app
        .post("/api/articles", None, json!({ "title": "Hello", "content": "x" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access denied. No token provided.");

    let (status, _) = app
        .send(reqwest::Method::GET, "/api/auth/profile", Some("junk"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// --- Articles ---

#[tokio::test]
async fn test_article_lifecycle() {
    let app = spawn_app().await;
    let token = app.register("writer").await;

    let article = app
        .create_article(
            &token,
            json!({ "title": "  Hello World  ", "content": "First post" }),
        )
        .await;
    let id = article["id"].as_i64().unwrap();
    assert_eq!(article["slug"], "hello-world");
    assert_eq!(article["status"], "draft");
    assert_eq!(article["language"], "en");
    assert_eq!(article["views"], 0);
    assert!(article["published_at"].is_null());

    // reads count views, including this one
    let (status, body) = app.get("/api/articles/hello-world").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["views"], 1);
    assert_eq!(body["article"]["author_name"], "writer");
    let (_, body) = app.get(&format!("/api/articles/{id}")).await;
    assert_eq!(body["article"]["views"], 2);

    // drafts are not listed by default
    let (_, body) = app.get("/api/articles").await;
    assert_eq!(body["pagination"]["total"], 0);

    let (status, body) = app
        .put(
            &format!("/api/articles/{id}"),
            &token,
            json!({ "status": "published" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Article updated successfully");
    let published_at = body["article"]["published_at"].clone();
    assert!(published_at.is_string());
    assert_eq!(body["article"]["slug"], "hello-world");

    // archiving and re-publishing keeps the first timestamp
    app.put(&format!("/api/articles/{id}"), &token, json!({ "status": "archived" }))
        .await;
    let (_, body) = app
        .put(
            &format!("/api/articles/{id}"),
            &token,
            json!({ "status": "published", "title": "Hello Again" }),
        )
        .await;
    assert_eq!(body["article"]["published_at"], published_at);
    assert_eq!(body["article"]["slug"], "hello-again");

    let (_, body) = app.get("/api/articles").await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["articles"][0]["id"], id);

    let (status, body) = app.delete(&format!("/api/articles/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Article deleted successfully");

    let (status, body) = app.get(&format!("/api/articles/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Article not found");
}

#[tokio::test]
async fn test_duplicate_titles_get_distinct_slugs() {
    let app = spawn_app().await;
    let token = app.register("writer").await;

    let first = app
        .create_article(&token, json!({ "title": "Same Title", "content": "a" }))
        .await;
    let second = app
        .create_article(&token, json!({ "title": "Same Title", "content": "b" }))
        .await;

    assert_eq!(first["slug"], "same-title");
    let second_slug = second["slug"].as_str().unwrap();
    assert!(second_slug.starts_with("same-title-"));
    assert_ne!(first["slug"], second["slug"]);
}

#[tokio::test]
async fn test_article_ownership_enforced() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    let other = app.register("other").await;
    let admin = app.admin_token().await;

    let article = app
        .create_article(&owner, json!({ "title": "Mine Only", "content": "x" }))
        .await;
    let path = format!("/api/articles/{}", article["id"]);

    let (status, body) = app.put(&path, &other, json!({ "title": "Stolen" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions");

    let (status, _) = app.delete(&path, &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&path, &admin).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&path, &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_article_list_filters_and_pagination() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let token = app.register("writer").await;

    let (status, body) = app
        .post("/api/categories", Some(&admin), json!({ "name": "Rust Tips" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = body["categoryId"].as_i64().unwrap();

    for i in 0..3 {
        app.create_article(
            &token,
            json!({
                "title": format!("Tip number {i}"),
                "content": "borrow checker",
                "status": "published",
                "category_id": category_id
            }),
        )
        .await;
    }
    app.create_article(
        &token,
        json!({ "title": "Bonjour", "content": "salut", "status": "published", "language": "fr" }),
    )
    .await;
    app.create_article(&token, json!({ "title": "Unfinished", "content": "wip" }))
        .await;

    let (_, body) = app.get("/api/articles?category=rust-tips&limit=2").await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["articles"][0]["category_name"], "Rust Tips");

    let (_, body) = app.get("/api/articles?category=rust-tips&limit=2&page=2").await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/articles?language=fr").await;
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = app.get("/api/articles?search=BORROW").await;
    assert_eq!(body["pagination"]["total"], 3);

    let (_, body) = app.get("/api/articles?status=draft").await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["articles"][0]["title"], "Unfinished");

    // junk paging input falls back to defaults
    let (status, body) = app.get("/api/articles?page=abc&limit=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 10);

    let (status, body) = app
        .get("/api/articles?category=rust-tips&limit=9223372036854775807")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["limit"], i64::MAX);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 1);
    assert_eq!(body["articles"].as_array().unwrap().len(), 3);

    let (status, _) = app.get("/api/articles?status=deleted").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/categories").await;
    assert_eq!(body["categories"][0]["article_count"], 3);
}

// --- Categories and pages ---

#[tokio::test]
async fn test_editorial_routes_reject_authors() {
    let app = spawn_app().await;
    let author = app.register("writer").await;

    let (status, body) = app
        .post("/api/categories", Some(&author), json!({ "name": "Nope" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions");

    let (status, _) = app
        .send(reqwest::Method::GET, "/api/comments", Some(&author), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(reqwest::Method::GET, "/api/comments", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_category_management() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/api/categories",
            Some(&admin),
            json!({ "name": "Guides", "description": "How-tos" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let parent = body["categoryId"].as_i64().unwrap();
    assert_eq!(body["category"]["slug"], "guides");

    let (status, body) = app
        .post("/api/categories", Some(&admin), json!({ "name": "Guides" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Category with this name already exists");

    let (status, body) = app
        .post(
            "/api/categories",
            Some(&admin),
            json!({ "name": "Orphan", "parent_id": 9999 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Parent category not found");

    let (_, body) = app
        .post(
            "/api/categories",
            Some(&admin),
            json!({ "name": "Beginner Guides", "parent_id": parent }),
        )
        .await;
    let child = body["categoryId"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/categories/{child}"),
            &admin,
            json!({ "parent_id": child }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A category cannot be its own parent");

    let (status, body) = app
        .put(
            &format!("/api/categories/{child}"),
            &admin,
            json!({ "parent_id": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["category"]["parent_id"].is_null());

    let (status, body) = app.get("/api/categories/guides").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["description"], "How-tos");

    let (status, _) = app
        .delete(&format!("/api/categories/{parent}"), &admin)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/categories/{parent}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_management() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/api/pages",
            Some(&admin),
            json!({ "title": "About Us", "content": "We write things.", "status": "published" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["pageId"].as_i64().unwrap();
    assert_eq!(body["page"]["slug"], "about-us");

    app.post(
        "/api/pages",
        Some(&admin),
        json!({ "title": "Impressum", "content": "Angaben", "language": "de" }),
    )
    .await;

    let (_, body) = app.get("/api/pages").await;
    assert_eq!(body["pages"].as_array().unwrap().len(), 1);
    let (_, body) = app.get("/api/pages?status=draft&language=de").await;
    assert_eq!(body["pages"][0]["title"], "Impressum");

    let (status, body) = app.get("/api/pages/about-us").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"]["content"], "We write things.");

    let (status, body) = app
        .put(&format!("/api/pages/{id}"), &admin, json!({ "title": "About" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"]["slug"], "about");

    let (status, _) = app.get("/api/pages/about-us").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/pages/{id}"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.delete(&format!("/api/pages/{id}"), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Page not found");
}

// --- Comments ---

#[tokio::test]
async fn test_comment_moderation_flow() {
    let app = spawn_app().await;
    let author = app.register("writer").await;
    let admin = app.admin_token().await;

    let draft = app
        .create_article(&author, json!({ "title": "Draft Post", "content": "x" }))
        .await;
    let (status, body) = app
        .post(
            "/api/comments",
            None,
            json!({ "article_id": draft["id"], "author_name": "Visitor", "content": "Hi" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Article not found");

    let live = app
        .create_article(
            &author,
            json!({ "title": "Live Post", "content": "x", "status": "published" }),
        )
        .await;
    let (status, body) = app
        .post(
            "/api/comments",
            None,
            json!({
                "article_id": live["id"],
                "author_name": "Visitor",
                "author_email": "",
                "content": "Nice post"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comment"]["status"], "pending");
    assert!(body["comment"]["author_email"].is_null());
    let good = body["comment"]["id"].as_i64().unwrap();

    let (_, body) = app
        .post(
            "/api/comments",
            None,
            json!({ "article_id": live["id"], "author_name": "Bot", "content": "Buy now" }),
        )
        .await;
    let spam = body["comment"]["id"].as_i64().unwrap();

    let (_, body) = app
        .send(reqwest::Method::GET, "/api/comments?status=pending", Some(&admin), None)
        .await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 2);
    assert_eq!(body["comments"][0]["article_title"], "Live Post");

    // unmoderated comments are already public
    let (status, body) = app
        .get(&format!("/api/comments/article/{}", live["id"]))
        .await;
    assert_eq!(status, StatusCode::OK);
    let public = body["comments"].as_array().unwrap();
    assert_eq!(public.len(), 2);
    assert!(public.iter().all(|c| c["status"] == "pending"));

    let (status, body) = app.patch(&format!("/api/comments/{good}/approve"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment approved successfully");

    let (_, body) = app
        .send(reqwest::Method::GET, "/api/comments?status=approved", Some(&admin), None)
        .await;
    let approved = body["comments"].as_array().unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0]["id"], good);
    assert_eq!(approved[0]["status"], "approved");
    assert_eq!(approved[0]["article_title"], "Live Post");
    let (status, body) = app.patch(&format!("/api/comments/{spam}/reject"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment rejected successfully");

    let (_, body) = app
        .get(&format!("/api/comments/article/{}", live["id"]))
        .await;
    let public = body["comments"].as_array().unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["status"], "approved");

    let (status, body) = app
        .put(
            &format!("/api/comments/{good}"),
            &admin,
            json!({ "content": "Nice post (edited)" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comment"]["content"], "Nice post (edited)");
    assert_eq!(body["comment"]["status"], "approved");

    let (status, _) = app.delete(&format!("/api/comments/{spam}"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.patch("/api/comments/abc/approve", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.patch("/api/comments/99999/approve", &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // deleting the article takes its comments along
    let (status, _) = app
        .delete(&format!("/api/articles/{}", live["id"]), &admin)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app
        .send(reqwest::Method::GET, "/api/comments", Some(&admin), None)
        .await;
    assert!(body["comments"].as_array().unwrap().is_empty());
}
