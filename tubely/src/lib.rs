//! # tubely: video metadata service
//!
//! `tubely` stores video records in SQLite and lets the owner of a video attach a thumbnail
//! image to it. Uploaded images are written to a local assets directory under a random,
//! URL-safe name and served back over HTTP at `/assets/<file>`.
//!
//! ## Request Flow
//!
//! A thumbnail upload (`POST /api/thumbnail_upload/{videoID}`) is handled strictly in order:
//!
//! 1. the path id is parsed as a UUID,
//! 2. the caller is authenticated from its bearer JWT ([`auth`]),
//! 3. the `thumbnail` multipart part is read (at most `uploads.max_thumbnail_size` bytes),
//! 4. the declared media type is checked against JPEG and PNG ([`assets::ImageFormat`]),
//! 5. the video is loaded and its owner compared with the caller,
//! 6. the image is written to the assets root ([`assets::LocalAssetStore`]),
//! 7. the video's `thumbnail_url` is updated and the stored record returned.
//!
//! Any failure short-circuits the remaining steps, so nothing touches the filesystem until the
//! caller is known to own the video. If the record update fails after the file was written, the
//! file is removed again.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use tubely::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = tubely::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     tubely::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod assets;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test_utils;

use assets::LocalAssetStore;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use openapi::ApiDoc;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{UserId, VideoId};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .assets(LocalAssetStore::new("./assets"))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub assets: LocalAssetStore,
}

/// Get the tubely database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Build the application router.
///
/// - `/api/*`: video endpoints
/// - `/assets/*`: stored thumbnails, served from the assets root
/// - `/healthz`: liveness
/// - `/docs`, `/api-docs/openapi.json`: API documentation
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.uploads.body_limit();
    let assets_root = state.assets.root().to_path_buf();

    let api_routes = Router::new()
        .route(
            "/thumbnail_upload/{videoID}",
            post(api::handlers::videos::upload_thumbnail).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/videos/{videoID}", get(api::handlers::videos::get_video));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .with_state(state)
        .nest_service("/assets", ServeDir::new(assets_root))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Main application struct that owns all resources and handles lifecycle.
///
/// 1. **Create**: [`Application::new`] opens the datastore, runs migrations and prepares the
///    assets root
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests finish and the
///    datastore and telemetry are closed
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application, reusing `pool` when given instead of connecting from config.
    ///
    /// A supplied pool is assumed to be migrated already.
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!("Starting tubely with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => pool,
            None => db::connect(&config.database).await?,
        };

        let assets = LocalAssetStore::new(&config.assets_root);
        assets.ensure_root().await?;
        info!(root = %assets.root().display(), "Assets root ready");

        let state = AppState::builder().db(pool.clone()).config(config.clone()).assets(assets).build();
        let router = build_router(state);

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "tubely listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_config, create_test_pool};
    use axum::http::StatusCode;

    #[test_log::test(tokio::test)]
    async fn test_application_health_check() {
        let assets_dir = tempfile::tempdir().unwrap();
        let config = create_test_config(assets_dir.path());
        let pool = create_test_pool().await;

        let server = Application::new_with_pool(config, Some(pool)).await.unwrap().into_test_server();

        let response = server.get("/healthz").await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.text(), "OK");
    }

    #[test_log::test(tokio::test)]
    async fn test_application_connects_and_migrates() {
        let assets_dir = tempfile::tempdir().unwrap();
        let mut config = create_test_config(&assets_dir.path().join("assets"));
        config.database.url = format!("sqlite://{}", assets_dir.path().join("tubely.db").display());

        let app = Application::new(config.clone()).await.unwrap();
        assert!(config.assets_root.is_dir());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos").fetch_one(&app.pool).await.unwrap();
        assert_eq!(count, 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_openapi_document_is_served() {
        let assets_dir = tempfile::tempdir().unwrap();
        let config = create_test_config(assets_dir.path());
        let pool = create_test_pool().await;
        let server = Application::new_with_pool(config, Some(pool)).await.unwrap().into_test_server();

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status(StatusCode::OK);
        let doc: serde_json::Value = response.json();
        assert!(doc["paths"]["/api/thumbnail_upload/{videoID}"]["post"].is_object());
        assert!(doc["paths"]["/api/videos/{videoID}"]["get"].is_object());

        server.get("/docs").await.assert_status(StatusCode::OK);
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_asset_is_not_found() {
        let assets_dir = tempfile::tempdir().unwrap();
        let config = create_test_config(assets_dir.path());
        let pool = create_test_pool().await;
        let server = Application::new_with_pool(config, Some(pool)).await.unwrap().into_test_server();

        server.get("/assets/nope.png").await.assert_status(StatusCode::NOT_FOUND);
    }
}
