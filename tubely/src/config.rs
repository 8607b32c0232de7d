//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `TUBELY_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `TUBELY_` override YAML values
//! 3. **Plain deployment variables** - `DATABASE_URL`, `PORT`, `JWT_SECRET` and `ASSETS_ROOT`
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `TUBELY_UPLOADS__MAX_THUMBNAIL_SIZE=2097152` sets the `uploads.max_thumbnail_size` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use tubely::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}", config.bind_address());
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! TUBELY_PORT=8080
//!
//! # Signing secret for bearer tokens
//! JWT_SECRET="change-me"
//!
//! # Serve generated asset URLs from a public host instead of localhost
//! TUBELY_PUBLIC_BASE_URL="https://media.example.com"
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::errors::Error;

/// Default upper bound on a thumbnail image (10 MiB)
pub const DEFAULT_MAX_THUMBNAIL_SIZE: u64 = 10 << 20;

/// Room left in the request body limit for multipart boundaries, part headers and small text fields
pub const MULTIPART_OVERHEAD: u64 = 64 << 10;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "TUBELY_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Constructed once at process start and read-only afterwards; handlers see it through
/// [`crate::AppState`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Base URL used when building asset URLs. Defaults to `http://localhost:{port}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<Url>,
    /// Directory uploaded assets are written to and served from
    pub assets_root: PathBuf,
    /// Secret key for JWT signing and verification
    pub secret_key: Option<String>,
    /// Video datastore connection
    pub database: DatabaseConfig,
    /// Bearer token verification settings
    pub auth: AuthConfig,
    /// Upload limits
    pub uploads: UploadConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection string; the file is created when missing
    pub url: String,
    pub pool: PoolSettings,
}

/// Connection pool settings passed straight to SQLx.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Maximum time to wait for a connection
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Required `iss` claim on bearer tokens
    pub issuer: String,
    /// Clock skew tolerated when checking `exp`
    #[serde(with = "humantime_serde")]
    pub leeway: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Largest accepted thumbnail image, in bytes. The request body may exceed this by
    /// [`MULTIPART_OVERHEAD`] to fit the multipart framing around the image.
    pub max_thumbnail_size: u64,
}

impl UploadConfig {
    /// Limit applied to the whole upload request body
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_thumbnail_size.saturating_add(MULTIPART_OVERHEAD)).unwrap_or(usize::MAX)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8091,
            public_base_url: None,
            assets_root: PathBuf::from("./assets"),
            secret_key: None,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            uploads: UploadConfig::default(),
            enable_otel_export: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://tubely.db".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "tubely-access".to_string(),
            leeway: Duration::ZERO,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_thumbnail_size: DEFAULT_MAX_THUMBNAIL_SIZE,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        match self.secret_key.as_deref() {
            None | Some("") => {
                return Err(Error::Internal {
                    operation: "Config validation: secret_key is not configured. \
                     Set JWT_SECRET or TUBELY_SECRET_KEY, or add secret_key to the config file."
                        .to_string(),
                });
            }
            Some(_) => {}
        }

        if self.uploads.max_thumbnail_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_thumbnail_size must be greater than zero".to_string(),
            });
        }

        if self.auth.issuer.trim().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: auth.issuer cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("TUBELY_").ignore(&["config"]).split("__"))
            // Variable names used by existing deployments
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::raw().only(&["PORT"]).map(|_| "port".into()))
            .merge(Env::raw().only(&["JWT_SECRET"]).map(|_| "secret_key".into()))
            .merge(Env::raw().only(&["ASSETS_ROOT"]).map(|_| "assets_root".into()))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Public URL under which an asset stored as `file_name` is served.
    pub fn asset_url(&self, file_name: &str) -> String {
        let base = match &self.public_base_url {
            Some(url) => url.as_str().trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        };
        format!("{base}/assets/{file_name}")
    }
}
