//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (used for the
//!   payment return redirect)
//! - `PAYMOB_API_KEY` - Static gateway API key
//! - `PAYMOB_INTEGRATION_ID` - Gateway card integration id
//! - `PAYMOB_IFRAME_ID` - Gateway iframe id for the redirect URL
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `PAYMOB_BASE_URL` - Gateway API base (default: <https://accept.paymob.com/api>)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`,
//!   `SMTP_FROM_ADDRESS` - welcome-email delivery; subscription works without
//!   them, the email is simply skipped
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Payment gateway configuration
    pub paymob: PaymobConfig,
    /// SMTP configuration for the welcome email, if configured
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Paymob gateway configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct PaymobConfig {
    /// Gateway API base URL.
    pub base_url: String,
    /// Static merchant API key exchanged for short-lived auth tokens.
    pub api_key: SecretString,
    /// Card integration id sent with payment-key requests.
    pub integration_id: i64,
    /// Iframe id embedded in the redirect URL.
    pub iframe_id: String,
}

impl std::fmt::Debug for PaymobConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymobConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("integration_id", &self.integration_id)
            .field("iframe_id", &self.iframe_id)
            .finish()
    }
}

/// SMTP configuration for transactional email.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = require_env("STOREFRONT_DATABASE_URL")?;
        let base_url = require_env("STOREFRONT_BASE_URL")?;

        let host = optional_env("STOREFRONT_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".into(), e.to_string()))?;

        let port = optional_env("STOREFRONT_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".into(), e.to_string()))?;

        let paymob = PaymobConfig {
            base_url: optional_env("PAYMOB_BASE_URL")
                .unwrap_or_else(|| "https://accept.paymob.com/api".to_string()),
            api_key: SecretString::from(require_env("PAYMOB_API_KEY")?),
            integration_id: require_env("PAYMOB_INTEGRATION_ID")?
                .parse::<i64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("PAYMOB_INTEGRATION_ID".into(), e.to_string())
                })?,
            iframe_id: require_env("PAYMOB_IFRAME_ID")?,
        };

        let email = load_email_config()?;

        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port,
            base_url,
            paymob,
            email,
            sentry_dsn: optional_env("SENTRY_DSN"),
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Expose the database URL for pool creation.
    #[must_use]
    pub fn database_url(&self) -> &str {
        self.database_url.expose_secret()
    }
}

/// Load SMTP config if `SMTP_HOST` is set; all other SMTP vars then become
/// required.
fn load_email_config() -> Result<Option<EmailConfig>, ConfigError> {
    let Some(smtp_host) = optional_env("SMTP_HOST") else {
        return Ok(None);
    };

    let smtp_port = optional_env("SMTP_PORT")
        .unwrap_or_else(|| "587".to_string())
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".into(), e.to_string()))?;

    Ok(Some(EmailConfig {
        smtp_host,
        smtp_port,
        smtp_username: require_env("SMTP_USERNAME")?,
        smtp_password: SecretString::from(require_env("SMTP_PASSWORD")?),
        from_address: require_env("SMTP_FROM_ADDRESS")?,
    }))
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
