//! Canonical product shape and the buyer-facing view adapter.
//!
//! Staff author products as flat string arrays (colors, sizes) plus a sparse
//! stock map; the shop front wants structured variants with swatch colors and
//! per-color availability. The two shapes meet in exactly one place:
//! [`ProductView::from_product`], the adapter at the storage boundary. The
//! flat [`Product`] is the canonical internal representation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stock::{Stock, available_stock};
use crate::types::ProductId;

/// Two-phase creation state for a product.
///
/// Creation is `draft` (row exists, no images) -> `images_uploaded` ->
/// `complete`. A crash between phases leaves a stalled `draft` that the CLI
/// sweep can detect and clean up, rather than an orphaned upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductPhase {
    #[default]
    Draft,
    ImagesUploaded,
    Complete,
}

impl ProductPhase {
    /// Stable string form used in the database and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::ImagesUploaded => "images_uploaded",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for ProductPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "images_uploaded" => Ok(Self::ImagesUploaded),
            "complete" => Ok(Self::Complete),
            _ => Err(format!("invalid product phase: {s}")),
        }
    }
}

/// Canonical product record, as authored by staff.
///
/// Invariants enforced by the admin mutator: `price > 0`, at least one color
/// and one size on finalized products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_urls: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    /// Sparse stock map keyed by `"{color}-{size}"`, `"{size}"`, or
    /// `"{color}"`. `None` means stock is not tracked (unbounded).
    pub stock_by_size: Option<HashMap<String, i64>>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub phase: ProductPhase,
}

impl Product {
    /// Resolve available stock for a variant of this product.
    #[must_use]
    pub fn available_stock(&self, color: &str, size: &str) -> Stock {
        available_stock(self, color, size)
    }
}

/// Buyer-facing structured product shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub images: Vec<ImageView>,
    pub colors: Vec<ColorView>,
    pub sizes: Vec<SizeView>,
    pub tags: Vec<String>,
}

/// A product image, optionally associated with a color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageView {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A selectable color swatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorView {
    pub name: String,
    pub hex: String,
    pub in_stock: bool,
}

/// A selectable size with per-color availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeView {
    pub label: String,
    pub in_stock_by_color: HashMap<String, bool>,
}

/// Fallback swatch color when a name has no mapping.
const FALLBACK_HEX: &str = "#9CA3AF";

/// Swatch hex for a color name, defaulting to gray for unknown names.
#[must_use]
pub fn color_hex(name: &str) -> &'static str {
    match name.trim().to_lowercase().as_str() {
        "red" => "#EF4444",
        "blue" => "#3B82F6",
        "green" => "#10B981",
        "yellow" => "#F59E0B",
        "orange" => "#F97316",
        "purple" => "#A855F7",
        "pink" => "#EC4899",
        "brown" => "#8B4513",
        "black" => "#000000",
        "white" => "#FFFFFF",
        "gray" | "grey" => "#9CA3AF",
        "navy" => "#1E3A8A",
        "beige" => "#F5F5DC",
        "tan" => "#D2B48C",
        "cream" => "#FFFDD0",
        "honey" => "#E5C195",
        "sky blue" => "#BAE6FD",
        "multi" => "#FF69B4",
        "rainbow" => "#FFB6C1",
        "default" => "#E5E7EB",
        _ => FALLBACK_HEX,
    }
}

impl ProductView {
    /// Adapt a canonical product to the buyer-facing shape.
    ///
    /// - Images are paired positionally with color names where both exist.
    /// - A product without colors gets a single `Default` swatch; one without
    ///   sizes gets a single `One Size` entry.
    /// - Per-color availability comes from the stock fallback chain; an
    ///   untracked product is in stock everywhere.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        let colors: Vec<ColorView> = if product.colors.is_empty() {
            vec![ColorView {
                name: "Default".to_string(),
                hex: "#E5E7EB".to_string(),
                in_stock: true,
            }]
        } else {
            product
                .colors
                .iter()
                .map(|name| ColorView {
                    name: name.clone(),
                    hex: color_hex(name).to_string(),
                    in_stock: product
                        .sizes
                        .iter()
                        .any(|size| product.available_stock(name, size).in_stock())
                        || product.sizes.is_empty(),
                })
                .collect()
        };

        let images = product
            .image_urls
            .iter()
            .enumerate()
            .map(|(index, url)| ImageView {
                url: url.clone(),
                color: product.colors.get(index).cloned(),
            })
            .collect();

        let sizes: Vec<SizeView> = if product.sizes.is_empty() {
            let in_stock_by_color = colors
                .iter()
                .map(|color| (color.name.clone(), color.in_stock))
                .collect();
            vec![SizeView {
                label: "One Size".to_string(),
                in_stock_by_color,
            }]
        } else {
            product
                .sizes
                .iter()
                .map(|label| SizeView {
                    label: label.clone(),
                    in_stock_by_color: colors
                        .iter()
                        .map(|color| {
                            (
                                color.name.clone(),
                                product.available_stock(&color.name, label).in_stock(),
                            )
                        })
                        .collect(),
                })
                .collect()
        };

        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            images,
            colors,
            sizes,
            tags: product.tags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_product() -> Product {
        Product {
            id: ProductId::generate(),
            name: "Dungarees".to_string(),
            description: "Soft cotton".to_string(),
            price: Decimal::from(250),
            image_urls: vec!["/a.jpg".to_string(), "/b.jpg".to_string()],
            colors: vec!["Honey".to_string(), "Navy".to_string()],
            sizes: vec!["S".to_string(), "M".to_string()],
            stock_by_size: None,
            tags: vec!["new".to_string()],
            is_active: true,
            phase: ProductPhase::Complete,
        }
    }

    #[test]
    fn view_pairs_images_with_colors_by_position() {
        let view = ProductView::from_product(&base_product());
        assert_eq!(view.images.len(), 2);
        assert_eq!(view.images[0].color.as_deref(), Some("Honey"));
        assert_eq!(view.images[1].color.as_deref(), Some("Navy"));
    }

    #[test]
    fn known_color_names_get_their_swatch_hex() {
        let view = ProductView::from_product(&base_product());
        assert_eq!(view.colors[0].hex, "#E5C195");
        assert_eq!(view.colors[1].hex, "#1E3A8A");
        assert_eq!(color_hex("no-such-color"), FALLBACK_HEX);
    }

    #[test]
    fn untracked_stock_is_in_stock_everywhere() {
        let view = ProductView::from_product(&base_product());
        for size in &view.sizes {
            assert!(size.in_stock_by_color.values().all(|v| *v));
        }
    }

    #[test]
    fn tracked_stock_controls_per_color_availability() {
        let mut product = base_product();
        product.stock_by_size = Some(
            [("Honey-S".to_string(), 2_i64), ("Navy-S".to_string(), 0)]
                .into_iter()
                .collect(),
        );
        let view = ProductView::from_product(&product);

        let size_s = view.sizes.iter().find(|s| s.label == "S").expect("size S");
        assert_eq!(size_s.in_stock_by_color.get("Honey"), Some(&true));
        assert_eq!(size_s.in_stock_by_color.get("Navy"), Some(&false));
    }

    #[test]
    fn colorless_product_gets_default_swatch() {
        let mut product = base_product();
        product.colors.clear();
        product.image_urls.clear();
        let view = ProductView::from_product(&product);
        assert_eq!(view.colors.len(), 1);
        assert_eq!(view.colors[0].name, "Default");
    }

    #[test]
    fn sizeless_product_gets_one_size() {
        let mut product = base_product();
        product.sizes.clear();
        let view = ProductView::from_product(&product);
        assert_eq!(view.sizes.len(), 1);
        assert_eq!(view.sizes[0].label, "One Size");
    }
}
