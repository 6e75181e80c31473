//! Product authoring queries.
//!
//! Creation is two-phase: a draft row first, then images, then finalization.
//! Every phase transition is an explicit column write, so a crash between
//! steps leaves a row whose phase says exactly how far it got. The sweep
//! query finds drafts that never completed.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use marigold_core::{Product, ProductId, ProductPhase};

use super::RepositoryError;

/// Repository for product authoring.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

/// Fields staff submit when creating or finalizing a product.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub stock_by_size: Option<HashMap<String, i64>>,
    pub tags: Vec<String>,
    pub is_active: bool,
}

/// Raw product row as stored.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    image_urls: Vec<String>,
    colors: Vec<String>,
    sizes: Vec<String>,
    stock_by_size: Option<Json<HashMap<String, i64>>>,
    tags: Vec<String>,
    is_active: bool,
    phase: String,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
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

    /// List every product regardless of phase or active flag, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as(&format!("{SELECT_PRODUCT} ORDER BY created_at DESC"))
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
        let row: Option<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCT} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(self.pool)
            .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Phase 1: insert a draft row with everything except images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_draft(&self, draft: &ProductDraft) -> Result<ProductId, RepositoryError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO products (name, description, price, image_urls, colors, sizes, \
             stock_by_size, tags, is_active, phase) \
             VALUES ($1, $2, $3, '{}', $4, $5, $6, $7, $8, 'draft') \
             RETURNING id",
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.colors)
        .bind(&draft.sizes)
        .bind(draft.stock_by_size.as_ref().map(Json))
        .bind(&draft.tags)
        .bind(draft.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductId::new(id))
    }

    /// Phase 2: replace the image list and advance to `images_uploaded`.
    ///
    /// Already-finalized products keep their `complete` phase; re-uploading
    /// images must not knock a live product back into creation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_images(
        &self,
        id: ProductId,
        image_urls: &[String],
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE products \
             SET image_urls = $2, \
                 phase = CASE WHEN phase = 'complete' THEN phase ELSE 'images_uploaded' END, \
                 updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(image_urls)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Phase 3 (and later edits): write the full field set and mark the
    /// product `complete`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn finalize(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "UPDATE products \
             SET name = $2, description = $3, price = $4, colors = $5, sizes = $6, \
                 stock_by_size = $7, tags = $8, is_active = $9, phase = 'complete', \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, description, price, image_urls, colors, sizes, \
                       stock_by_size, tags, is_active, phase",
        )
        .bind(id.as_uuid())
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.colors)
        .bind(&draft.sizes)
        .bind(draft.stock_by_size.as_ref().map(Json))
        .bind(&draft.tags)
        .bind(draft.is_active)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Delete a product row. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find drafts that never advanced past creation within the window.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stalled_drafts(
        &self,
        older_than: Duration,
    ) -> Result<Vec<(ProductId, String, DateTime<Utc>)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct StalledRow {
            id: Uuid,
            name: String,
            created_at: DateTime<Utc>,
        }

        let cutoff = Utc::now() - older_than;
        let rows: Vec<StalledRow> = sqlx::query_as(
            "SELECT id, name, created_at FROM products \
             WHERE phase = 'draft' AND created_at < $1 \
             ORDER BY created_at",
        )
        .bind(cutoff)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| (ProductId::new(r.id), r.name, r.created_at))
            .collect())
    }
}
