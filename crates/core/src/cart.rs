//! The buyer's cart: an in-memory list of line items.
//!
//! A line is keyed by `(product, color, size)`; adding the same variant twice
//! increments the existing line instead of appending. The cart itself is pure
//! and synchronous - the storefront mirrors it into the session slot after
//! every mutation so it survives a reload, while the shipping address is
//! deliberately never persisted alongside it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Identifier of a cart/order line, derived from `(product, color, size)`.
///
/// Two `add_item` calls with the same variant tuple produce the same
/// `LineId`, which is what makes them merge into a single line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    /// Derive the line id for a product variant.
    #[must_use]
    pub fn derive(product_id: ProductId, color: &str, size: &str) -> Self {
        Self(format!("{product_id}:{color}:{size}"))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LineId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Dedup key derived from `(product_id, color, size)`.
    pub line_id: LineId,
    /// Product this line refers to, kept for stock lookups.
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub image_url: String,
    pub color: String,
    pub size: String,
    pub quantity: u32,
}

impl CartItem {
    /// Build a cart line for a product variant, deriving its line id.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Decimal,
        image_url: impl Into<String>,
        color: impl Into<String>,
        size: impl Into<String>,
        quantity: u32,
    ) -> Self {
        let color = color.into();
        let size = size.into();
        Self {
            line_id: LineId::derive(product_id, &color, &size),
            product_id,
            name: name.into(),
            unit_price,
            image_url: image_url.into(),
            color,
            size,
            quantity,
        }
    }

    /// `unit_price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The cart: an ordered list of lines, one per product variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by id.
    #[must_use]
    pub fn get(&self, line_id: &LineId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.line_id == line_id)
    }

    /// Add a line to the cart.
    ///
    /// If a line with the same `line_id` already exists its quantity is
    /// incremented by the incoming quantity; otherwise the line is appended.
    pub fn add_item(&mut self, item: CartItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.line_id == item.line_id)
        {
            Some(existing) => existing.quantity += item.quantity,
            None => self.items.push(item),
        }
    }

    /// Remove a line by id. Removing an unknown line is a no-op.
    pub fn remove_item(&mut self, line_id: &LineId) {
        self.items.retain(|item| &item.line_id != line_id);
    }

    /// Set the quantity of a line. A quantity of zero removes the line.
    pub fn update_quantity(&mut self, line_id: &LineId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(line_id);
            return;
        }
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| &item.line_id == line_id)
        {
            item.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// `Σ unit_price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: ProductId, color: &str, size: &str, qty: u32, price: i64) -> CartItem {
        CartItem::new(
            product,
            "Onesie",
            Decimal::from(price),
            "/img.jpg",
            color,
            size,
            qty,
        )
    }

    #[test]
    fn repeated_adds_of_same_variant_merge_into_one_line() {
        let product = ProductId::generate();
        let mut cart = Cart::new();
        cart.add_item(item(product, "Blue", "M", 1, 100));
        cart.add_item(item(product, "Blue", "M", 2, 100));
        cart.add_item(item(product, "Blue", "M", 3, 100));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 6);
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn different_variants_of_same_product_stay_separate() {
        let product = ProductId::generate();
        let mut cart = Cart::new();
        cart.add_item(item(product, "Blue", "M", 1, 100));
        cart.add_item(item(product, "Blue", "L", 1, 100));
        cart.add_item(item(product, "Red", "M", 1, 100));

        assert_eq!(cart.items().len(), 3);
    }

    #[test]
    fn update_quantity_zero_removes_the_line() {
        let product = ProductId::generate();
        let mut cart = Cart::new();
        let line = item(product, "Blue", "M", 2, 100);
        let line_id = line.line_id.clone();
        cart.add_item(line);

        cart.update_quantity(&line_id, 0);
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn subtotal_never_includes_removed_lines() {
        let product_a = ProductId::generate();
        let product_b = ProductId::generate();
        let mut cart = Cart::new();
        let keep = item(product_a, "Blue", "M", 2, 100);
        let drop = item(product_b, "Red", "S", 5, 40);
        let drop_id = drop.line_id.clone();
        cart.add_item(keep);
        cart.add_item(drop);

        cart.remove_item(&drop_id);
        assert_eq!(cart.subtotal(), Decimal::from(200));
    }

    #[test]
    fn update_quantity_replaces_rather_than_increments() {
        let product = ProductId::generate();
        let mut cart = Cart::new();
        let line = item(product, "Blue", "M", 2, 100);
        let line_id = line.line_id.clone();
        cart.add_item(line);

        cart.update_quantity(&line_id, 7);
        assert_eq!(cart.get(&line_id).map(|i| i.quantity), Some(7));
    }

    #[test]
    fn clear_empties_the_cart() {
        let mut cart = Cart::new();
        cart.add_item(item(ProductId::generate(), "Blue", "M", 2, 100));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }
}
