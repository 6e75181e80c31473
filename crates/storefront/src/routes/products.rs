//! Catalog route handlers.
//!
//! The listing is served from a short-TTL in-process cache; the detail view
//! always hits the database so stock availability is fresh when a buyer is
//! actually choosing a variant.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use marigold_core::{ProductId, ProductPhase, ProductView};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::{AppState, CATALOG_CACHE_KEY};

/// GET /api/products - the active catalog, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let views = state
        .catalog_cache()
        .try_get_with(CATALOG_CACHE_KEY, load_catalog(state.clone()))
        .await
        .map_err(|e: Arc<AppError>| AppError::Internal(format!("catalog load failed: {e}")))?;

    Ok(Json(views.as_ref().clone()))
}

/// GET /api/products/{id} - one product, structured for variant selection.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get(id)
        .await?
        .filter(|p| p.is_active && p.phase == ProductPhase::Complete)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductView::from_product(&product)))
}

/// Cache loader: one database read mapped to buyer views.
async fn load_catalog(state: AppState) -> Result<Arc<Vec<ProductView>>> {
    let repo = ProductRepository::new(state.pool());
    let products = repo.list_active().await?;
    let views = products.iter().map(ProductView::from_product).collect();
    Ok(Arc::new(views))
}
