//! Shared constructors for unit and HTTP tests.

use crate::auth::jwt::make_jwt;
use crate::config::{Config, DatabaseConfig, PoolSettings, UploadConfig};
use crate::db::handlers::{Repository, Videos};
use crate::db::models::videos::{VideoCreateDBRequest, VideoDBResponse};
use crate::types::UserId;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// A running test server with direct handles on its datastore and assets directory
pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
    pub config: Config,
    pub assets_dir: TempDir,
}

/// Migrated in-memory database.
///
/// Pinned to a single connection that never expires, since every new in-memory connection
/// opens an empty database.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    crate::migrator().run(&pool).await.expect("Failed to run migrations");
    pool
}

pub fn create_test_config(assets_root: &Path) -> Config {
    Config {
        secret_key: Some("test-secret-key-for-jwt".to_string()),
        assets_root: assets_root.to_path_buf(),
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool: PoolSettings {
                max_connections: 1,
                acquire_timeout: Duration::from_secs(5),
            },
        },
        uploads: UploadConfig {
            max_thumbnail_size: 64 * 1024,
        },
        ..Default::default()
    }
}

pub async fn create_test_app() -> TestApp {
    let assets_dir = tempfile::tempdir().expect("Failed to create assets dir");
    let config = create_test_config(assets_dir.path());
    let pool = create_test_pool().await;

    let server = crate::Application::new_with_pool(config.clone(), Some(pool.clone()))
        .await
        .expect("Failed to create application")
        .into_test_server();

    TestApp {
        server,
        pool,
        config,
        assets_dir,
    }
}

pub async fn create_test_video(pool: &SqlitePool, user_id: UserId) -> VideoDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let request = VideoCreateDBRequest {
        title: "Test video".to_string(),
        description: "Uploaded by a test".to_string(),
        user_id,
    };

    Videos::new(&mut conn).create(&request).await.expect("Failed to create test video")
}

pub fn bearer_token(user_id: UserId, config: &Config) -> String {
    make_jwt(user_id, config, Duration::from_secs(3600)).expect("Failed to create test token")
}

/// A form with a single `thumbnail` file part
pub fn thumbnail_form(content: &[u8], content_type: &str) -> MultipartForm {
    let file_name = match content_type {
        "image/png" => "thumbnail.png",
        _ => "thumbnail.jpg",
    };

    MultipartForm::new().add_part(
        "thumbnail",
        Part::bytes(content.to_vec()).file_name(file_name).mime_type(content_type),
    )
}

/// File names currently in the app's assets directory, sorted
pub fn stored_assets(app: &TestApp) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(app.assets_dir.path())
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
