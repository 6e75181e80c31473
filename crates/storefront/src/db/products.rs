//! Product repository: buyer-facing catalog reads.
//!
//! The flat stored shape is parsed into the canonical
//! [`marigold_core::Product`] here, at the storage boundary; the structured
//! buyer view is derived from that in the routes.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use marigold_core::{Product, ProductId, ProductPhase};

use super::RepositoryError;

/// Repository for product reads on the storefront.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

/// Raw product row as stored.
#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_urls: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub stock_by_size: Option<Json<HashMap<String, i64>>>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub phase: String,
}

impl ProductRow {
    pub(crate) fn into_product(self) -> Result<Product, RepositoryError> {
        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            price: self.price,
            image_urls: self.image_urls,
            colors: self.colors,
            sizes: self.sizes,
            stock_by_size: self.stock_by_size.map(|json| json.0),
            tags: self.tags,
            is_active: self.is_active,
            phase: self
                .phase
                .parse::<ProductPhase>()
                .map_err(RepositoryError::DataCorruption)?,
        })
    }
}

const SELECT_PRODUCT: &str = "\
    SELECT id, name, description, price, image_urls, colors, sizes, stock_by_size, tags, \
           is_active, phase \
    FROM products";

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active, fully created products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "{SELECT_PRODUCT} WHERE is_active AND phase = 'complete' ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Fetch a single product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("{SELECT_PRODUCT} WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(self.pool)
                .await?;

        row.map(ProductRow::into_product).transpose()
    }
}
