//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use marigold_core::ProductView;

use crate::config::StorefrontConfig;
use crate::services::mailer::{EmailService, MailerError};
use crate::services::paymob::PaymobClient;

/// Catalog cache TTL. Short enough that admin edits show up within a minute.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(60);

/// Cache key for the single active-catalog entry.
pub const CATALOG_CACHE_KEY: &str = "catalog";

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    paymob: PaymobClient,
    mailer: Option<EmailService>,
    catalog_cache: Cache<&'static str, Arc<Vec<ProductView>>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be built from config.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, MailerError> {
        let paymob = PaymobClient::new(config.paymob.clone());
        let mailer = config
            .email
            .as_ref()
            .map(EmailService::new)
            .transpose()?;

        let catalog_cache = Cache::builder()
            .max_capacity(4)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                paymob,
                mailer,
                catalog_cache,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn paymob(&self) -> &PaymobClient {
        &self.inner.paymob
    }

    /// Get the email sender, if SMTP is configured.
    #[must_use]
    pub fn mailer(&self) -> Option<&EmailService> {
        self.inner.mailer.as_ref()
    }

    /// Get a reference to the catalog cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<&'static str, Arc<Vec<ProductView>>> {
        &self.inner.catalog_cache
    }
}
