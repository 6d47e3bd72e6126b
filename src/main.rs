use std::sync::Arc;

use anyhow::Context;
use cms_backend::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
    seed::seed_admin,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = AppConfig::load().context("invalid configuration")?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cms_backend=debug,tower_http=info".into());

    // pretty logs for humans locally, JSON lines for the log shipper in production
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(&config.db_url)
        .await
        .context("failed to connect to Postgres, check DATABASE_URL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("database schema is up to date");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    if let Some(admin) = &config.admin {
        seed_admin(repo.as_ref(), admin)
            .await
            .context("failed to seed admin account")?;
    }

    let addr = config.bind_addr();
    let app = create_router(AppState { repo, config });

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Listening on {addr}");
    tracing::info!("API Documentation (Swagger UI) available at: http://{addr}/swagger-ui");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
