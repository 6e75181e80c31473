//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (same database as
//!   the storefront; the two binaries share tables, not credentials)
//! - `ADMIN_BASE_URL` - Public URL for the admin panel
//! - `ADMIN_USERNAME` - Staff login username
//! - `ADMIN_PASSWORD` - Staff login password
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `UPLOADS_DIR` - Product image storage root (default: uploads)
//! - `UPLOADS_BASE_URL` - Public URL prefix for stored images
//!   (default: `{ADMIN_BASE_URL}/uploads`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Staff login username
    pub username: String,
    /// Staff login password
    pub password: SecretString,
    /// Filesystem root for uploaded product images
    pub uploads_dir: PathBuf,
    /// Public URL prefix under which uploaded images are served
    pub uploads_base_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("uploads_dir", &self.uploads_dir)
            .field("uploads_base_url", &self.uploads_base_url)
            .finish_non_exhaustive()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = require_env("ADMIN_DATABASE_URL")?;
        let base_url = require_env("ADMIN_BASE_URL")?;

        let host = optional_env("ADMIN_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".into(), e.to_string()))?;

        let port = optional_env("ADMIN_PORT")
            .unwrap_or_else(|| "3001".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".into(), e.to_string()))?;

        let uploads_dir =
            PathBuf::from(optional_env("UPLOADS_DIR").unwrap_or_else(|| "uploads".to_string()));

        let uploads_base_url =
            optional_env("UPLOADS_BASE_URL").unwrap_or_else(|| format!("{base_url}/uploads"));

        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port,
            base_url,
            username: require_env("ADMIN_USERNAME")?,
            password: SecretString::from(require_env("ADMIN_PASSWORD")?),
            uploads_dir,
            uploads_base_url,
            sentry_dsn: optional_env("SENTRY_DSN"),
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Compare submitted credentials against the configured pair.
    #[must_use]
    pub fn credentials_match(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password.expose_secret() == password
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
