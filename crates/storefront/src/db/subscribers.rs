//! Newsletter subscriber repository.

use sqlx::PgPool;

use marigold_core::Email;

use super::RepositoryError;

/// Repository for subscriber writes.
pub struct SubscriberRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubscriberRepository<'a> {
    /// Create a new subscriber repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a subscription.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, email: &Email, source: &str) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO subscribers (email, source) VALUES ($1, $2)")
            .bind(email.as_str())
            .bind(source)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
