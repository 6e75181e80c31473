//! Session-stored state.
//!
//! The cart is serialized into the session under a versioned key; bump the
//! key when the cart shape changes and stale carts silently reset to empty
//! instead of failing to deserialize.

/// Session keys for buyer state.
pub mod keys {
    /// Key for the buyer's cart.
    pub const CART: &str = "cart_v1";
}
