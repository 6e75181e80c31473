//! Product maintenance: sweeping stalled drafts.
//!
//! Creation is two-phase; a crash between the draft insert and finalization
//! leaves a `draft` row behind. This command finds them and, with `--delete`,
//! removes them.

use chrono::Duration;
use tracing::{info, warn};

use marigold_admin::db::{ProductRepository, create_pool};

use super::{CommandError, database_url};

/// List or delete drafts older than the given window.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a query fails.
pub async fn sweep_drafts(older_than_hours: i64, delete: bool) -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = create_pool(&database_url).await?;
    let repo = ProductRepository::new(&pool);

    let stalled = repo
        .stalled_drafts(Duration::hours(older_than_hours))
        .await?;

    if stalled.is_empty() {
        info!(older_than_hours, "no stalled drafts");
        return Ok(());
    }

    for (id, name, created_at) in &stalled {
        warn!(product_id = %id, name = %name, created_at = %created_at, "stalled draft");
    }

    if delete {
        for (id, _, _) in &stalled {
            repo.delete(*id).await?;
            info!(product_id = %id, "stalled draft deleted");
        }
        info!(count = stalled.len(), "sweep complete");
    } else {
        info!(
            count = stalled.len(),
            "run again with --delete to remove them"
        );
    }

    Ok(())
}
