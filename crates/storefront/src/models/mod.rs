//! Storefront-local types.

pub mod session;
