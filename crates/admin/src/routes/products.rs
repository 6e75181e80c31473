//! Product authoring routes.
//!
//! Creation is the two-phase flow: POST makes a draft row, the image upload
//! advances it, and PUT finalizes. Finalization enforces the catalog
//! invariants (positive price, at least one color and size) - drafts are
//! allowed to be incomplete, live products are not.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use marigold_core::{Product, ProductId};

use crate::db::ProductRepository;
use crate::db::products::ProductDraft;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdminAuth;
use crate::state::AppState;

/// Staff-submitted product fields.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub stock_by_size: Option<HashMap<String, i64>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl ProductRequest {
    fn into_draft(self) -> ProductDraft {
        ProductDraft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            colors: trimmed(self.colors),
            sizes: trimmed(self.sizes),
            stock_by_size: self.stock_by_size,
            tags: trimmed(self.tags),
            is_active: self.is_active,
        }
    }
}

fn trimmed(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Checks shared by creation and finalization.
fn validate_common(draft: &ProductDraft) -> Result<()> {
    if draft.name.is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    if draft.price <= Decimal::ZERO {
        return Err(AppError::Validation("price must be positive".into()));
    }
    Ok(())
}

/// Extra invariants a product must satisfy before it can go live.
fn validate_complete(draft: &ProductDraft) -> Result<()> {
    validate_common(draft)?;
    if draft.colors.is_empty() {
        return Err(AppError::Validation(
            "a finalized product needs at least one color".into(),
        ));
    }
    if draft.sizes.is_empty() {
        return Err(AppError::Validation(
            "a finalized product needs at least one size".into(),
        ));
    }
    Ok(())
}

/// Response for draft creation.
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub id: ProductId,
}

/// GET /api/products
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.pool());
    Ok(Json(repo.list().await?))
}

/// POST /api/products - phase 1, the draft row.
#[instrument(skip(state, admin, request), fields(admin = %admin.username))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Json(request): Json<ProductRequest>,
) -> Result<(StatusCode, Json<CreateResponse>)> {
    let draft = request.into_draft();
    validate_common(&draft)?;

    let repo = ProductRepository::new(state.pool());
    let id = repo.create_draft(&draft).await?;

    tracing::info!(product_id = %id, name = %draft.name, "product draft created");
    Ok((StatusCode::CREATED, Json(CreateResponse { id })))
}

/// Response for an image upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub image_urls: Vec<String>,
}

/// POST /api/products/{id}/images - phase 2, multipart image upload.
///
/// New URLs are merged with the product's existing list, deduplicated, so a
/// retried upload never produces doubled entries.
#[instrument(skip(state, admin, multipart), fields(admin = %admin.username))]
pub async fn upload_images(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let mut image_urls = product.image_urls;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        if bytes.is_empty() {
            continue;
        }

        let stored = state.images().store(id, &file_name, &bytes).await?;
        if !image_urls.contains(&stored.url) {
            image_urls.push(stored.url);
        }
    }

    if image_urls.is_empty() {
        return Err(AppError::BadRequest("no images in upload".into()));
    }

    repo.set_images(id, &image_urls).await?;

    tracing::info!(product_id = %id, count = image_urls.len(), "product images stored");
    Ok(Json(UploadResponse { image_urls }))
}

/// PUT /api/products/{id} - phase 3 and all later edits.
#[instrument(skip(state, admin, request), fields(admin = %admin.username))]
pub async fn finalize(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<Product>> {
    let draft = request.into_draft();
    validate_complete(&draft)?;

    let repo = ProductRepository::new(state.pool());
    let product = repo
        .finalize(id, &draft)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    tracing::info!(product_id = %id, "product finalized");
    Ok(Json(product))
}

/// DELETE /api/products/{id}
#[instrument(skip(state, admin), fields(admin = %admin.username))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let repo = ProductRepository::new(state.pool());
    if repo.delete(id).await? {
        tracing::info!(product_id = %id, "product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("product {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProductRequest {
        ProductRequest {
            name: " Dungarees ".to_string(),
            description: "Soft cotton".to_string(),
            price: Decimal::from(250),
            colors: vec!["Honey".to_string(), "  ".to_string()],
            sizes: vec!["S".to_string()],
            stock_by_size: None,
            tags: vec![],
            is_active: true,
        }
    }

    #[test]
    fn draft_conversion_trims_and_drops_blanks() {
        let draft = request().into_draft();
        assert_eq!(draft.name, "Dungarees");
        assert_eq!(draft.colors, vec!["Honey".to_string()]);
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut draft = request().into_draft();
        draft.price = Decimal::ZERO;
        assert!(validate_common(&draft).is_err());
        draft.price = Decimal::from(-5);
        assert!(validate_common(&draft).is_err());
    }

    #[test]
    fn finalization_requires_a_color_and_a_size() {
        let mut draft = request().into_draft();
        draft.sizes.clear();
        assert!(validate_complete(&draft).is_err());

        let mut draft = request().into_draft();
        draft.colors.clear();
        assert!(validate_complete(&draft).is_err());

        assert!(validate_complete(&request().into_draft()).is_ok());
    }

    #[test]
    fn drafts_may_omit_variants() {
        let mut draft = request().into_draft();
        draft.colors.clear();
        draft.sizes.clear();
        assert!(validate_common(&draft).is_ok());
    }
}
