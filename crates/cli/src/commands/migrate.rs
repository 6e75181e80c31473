//! Database migration command.
//!
//! One shared database; migrations live with the storefront crate and are
//! embedded into this binary at compile time.

use tracing::info;

use super::{CommandError, database_url};
use marigold_admin::db::create_pool;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    info!("Migrations complete");
    Ok(())
}
