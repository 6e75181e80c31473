//! Middleware for the admin panel.

pub mod auth;
pub mod session;
