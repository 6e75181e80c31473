//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

/// Session-stored staff identity.
///
/// There is a single configured staff credential pair, so this carries only
/// the username for log lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub username: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the logged-in staff identity.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
