//! Per-variant stock resolution.
//!
//! Products track remaining stock in a sparse map whose keys may be
//! `"{color}-{size}"`, `"{size}"`, or `"{color}"`. One lookup path serves all
//! three authoring styles via a fallback chain; a product with no map at all
//! is treated as unbounded.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// Available stock for a product variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stock {
    /// The product does not track stock; no cap is enforced.
    Unbounded,
    /// At most this many units remain.
    Limited(u32),
}

impl Stock {
    /// Clamp a desired quantity to what is actually available.
    ///
    /// A quantity above the known stock is silently reduced to the maximum,
    /// never rejected - this also runs when the variant selection changes or
    /// fresher stock data arrives.
    #[must_use]
    pub const fn clamp(self, quantity: u32) -> u32 {
        match self {
            Self::Unbounded => quantity,
            Self::Limited(max) => {
                if quantity > max {
                    max
                } else {
                    quantity
                }
            }
        }
    }

    /// Whether at least one unit can be bought.
    #[must_use]
    pub const fn in_stock(self) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limited(n) => n > 0,
        }
    }
}

/// Resolve the available stock for a `(product, color, size)` tuple.
///
/// Probe order: `"{color}-{size}"`, then `"{size}"`, then `"{color}"`. The
/// first defined value wins; if none match the stock is 0. Negative values
/// in the map clamp to 0.
#[must_use]
pub fn available_stock(product: &Product, color: &str, size: &str) -> Stock {
    let Some(map) = &product.stock_by_size else {
        return Stock::Unbounded;
    };

    let combined = format!("{color}-{size}");
    let value = map
        .get(&combined)
        .or_else(|| map.get(size))
        .or_else(|| map.get(color))
        .copied()
        .unwrap_or(0);

    Stock::Limited(u32::try_from(value).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::catalog::ProductPhase;
    use crate::types::ProductId;
    use rust_decimal::Decimal;

    fn product_with_stock(stock: Option<HashMap<String, i64>>) -> Product {
        Product {
            id: ProductId::generate(),
            name: "Romper".to_string(),
            description: String::new(),
            price: Decimal::from(100),
            image_urls: vec![],
            colors: vec!["Red".to_string(), "Blue".to_string()],
            sizes: vec!["S".to_string(), "M".to_string()],
            stock_by_size: stock,
            tags: vec![],
            is_active: true,
            phase: ProductPhase::Complete,
        }
    }

    fn stock_map(entries: &[(&str, i64)]) -> HashMap<String, i64> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect()
    }

    #[test]
    fn exact_variant_key_wins_over_size_only() {
        let product = product_with_stock(Some(stock_map(&[("Red-M", 3), ("M", 10)])));
        assert_eq!(available_stock(&product, "Red", "M"), Stock::Limited(3));
    }

    #[test]
    fn size_only_key_is_second_in_the_chain() {
        let product = product_with_stock(Some(stock_map(&[("M", 10), ("Red", 2)])));
        assert_eq!(available_stock(&product, "Red", "M"), Stock::Limited(10));
    }

    #[test]
    fn color_only_key_is_the_last_fallback() {
        let product = product_with_stock(Some(stock_map(&[("Red", 2)])));
        assert_eq!(available_stock(&product, "Red", "M"), Stock::Limited(2));
    }

    #[test]
    fn unknown_variant_defaults_to_zero() {
        let product = product_with_stock(Some(stock_map(&[("Blue-S", 4)])));
        assert_eq!(available_stock(&product, "Red", "M"), Stock::Limited(0));
    }

    #[test]
    fn missing_map_means_unbounded() {
        let product = product_with_stock(None);
        assert_eq!(available_stock(&product, "Red", "M"), Stock::Unbounded);
        // Any quantity increase is allowed.
        assert_eq!(Stock::Unbounded.clamp(9999), 9999);
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        let product = product_with_stock(Some(stock_map(&[("Red-M", -5)])));
        assert_eq!(available_stock(&product, "Red", "M"), Stock::Limited(0));
    }

    #[test]
    fn clamp_reduces_excess_quantity_silently() {
        assert_eq!(Stock::Limited(3).clamp(10), 3);
        assert_eq!(Stock::Limited(3).clamp(2), 2);
        assert_eq!(Stock::Limited(0).clamp(1), 0);
    }
}
