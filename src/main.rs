use anyhow::{Context, Result};
use arbor_blog::config::BlogConfig;
use arbor_blog::database::sqlite::SqliteTreeStore;
use arbor_blog::features::blog::render::JsonRenderer;
use arbor_blog::io::local::LocalContentReader;
use arbor_blog::services::{BlogService, ContentImporter};
use arbor_blog::{AppState, app};
use sqlx::Sqlite;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // determine environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("arbor_blog=info,tower_http=info")),
        )
        .init();

    let config = Arc::new(BlogConfig::from_env()?);

    // verify db exists
    if !Sqlite::database_exists(&config.database_url)
        .await
        .unwrap_or(false)
    {
        warn!(url = %config.database_url, "Database not found, creating");
        Sqlite::create_database(&config.database_url)
            .await
            .with_context(|| format!("Unable to create database at {}", config.database_url))?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to create pool on {}", config.database_url))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let blog = Arc::new(BlogService::new(
        Box::new(SqliteTreeStore::new(pool.clone())),
        config.clone(),
    ));

    let blog_root = blog.ensure_blog_root().await?;
    info!(url_path = %blog_root.url_path, "Blog root ready");

    if let Some(content_dir) = &config.content_dir {
        let importer = ContentImporter::new(
            Box::new(LocalContentReader::new(content_dir.clone())),
            blog.clone(),
            content_dir.clone(),
        );
        importer.import_all().await?;
    }

    let state = AppState {
        blog,
        config: config.clone(),
        renderer: Arc::new(JsonRenderer),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Server listening");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
