//! Admin-local types.

pub mod session;

pub use session::CurrentAdmin;
