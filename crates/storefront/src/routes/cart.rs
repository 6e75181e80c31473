//! Cart route handlers.
//!
//! The cart lives in the session and nowhere else; every mutation loads it,
//! applies the pure cart operation, clamps against current stock, and writes
//! it back. Requested quantities above available stock are silently reduced,
//! never rejected.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use marigold_core::{Cart, CartItem, LineId, Product, ProductId, ProductPhase};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::session::keys;
use crate::state::AppState;

/// Cart snapshot returned from every cart endpoint.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub subtotal: Decimal,
}

impl CartResponse {
    fn from_cart(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
        }
    }
}

/// Request body for adding a variant to the cart.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub color: String,
    pub size: String,
    pub quantity: u32,
}

/// Request body for setting a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// Load the cart from the session, defaulting to empty.
pub async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session.get(keys::CART).await?.unwrap_or_default())
}

/// Write the cart back into the session.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(keys::CART, cart).await?;
    Ok(())
}

/// GET /api/cart
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartResponse>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartResponse::from_cart(&cart)))
}

/// POST /api/cart/items - add a variant, merging into an existing line.
///
/// The merged quantity is clamped to available stock for the variant; a
/// request that would exceed it lands on the maximum instead of failing.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartResponse>> {
    if request.quantity == 0 {
        return Err(AppError::BadRequest("quantity must be positive".into()));
    }

    let product = fetch_purchasable(&state, request.product_id).await?;

    let item = CartItem::new(
        request.product_id,
        product.name.clone(),
        product.price,
        image_for_color(&product, &request.color),
        request.color.clone(),
        request.size.clone(),
        request.quantity,
    );
    let line_id = item.line_id.clone();

    let mut cart = load_cart(&session).await?;
    cart.add_item(item);

    // Clamp the merged line, not just the increment.
    let merged = cart.get(&line_id).map_or(0, |line| line.quantity);
    let allowed = product
        .available_stock(&request.color, &request.size)
        .clamp(merged);
    cart.update_quantity(&line_id, allowed);

    save_cart(&session, &cart).await?;
    Ok(Json(CartResponse::from_cart(&cart)))
}

/// PATCH /api/cart/items/{line_id} - set a line's quantity (0 removes).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(line_id): Path<String>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartResponse>> {
    let line_id = LineId::from(line_id);
    let mut cart = load_cart(&session).await?;

    let Some(line) = cart.get(&line_id) else {
        return Err(AppError::NotFound(format!("cart line {line_id}")));
    };

    // Re-clamp against current stock; a delisted product keeps its line
    // editable so the buyer can still remove it.
    let repo = ProductRepository::new(state.pool());
    let allowed = match repo.get(line.product_id).await? {
        Some(product) => product
            .available_stock(&line.color, &line.size)
            .clamp(request.quantity),
        None => request.quantity,
    };

    cart.update_quantity(&line_id, allowed);
    save_cart(&session, &cart).await?;
    Ok(Json(CartResponse::from_cart(&cart)))
}

/// DELETE /api/cart/items/{line_id} - remove a line (unknown lines no-op).
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(line_id): Path<String>) -> Result<Json<CartResponse>> {
    let line_id = LineId::from(line_id);
    let mut cart = load_cart(&session).await?;
    cart.remove_item(&line_id);
    save_cart(&session, &cart).await?;
    Ok(Json(CartResponse::from_cart(&cart)))
}

/// DELETE /api/cart - clear every line.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(Json(CartResponse::from_cart(&cart)))
}

/// Fetch a product the buyer is allowed to purchase.
async fn fetch_purchasable(state: &AppState, id: ProductId) -> Result<Product> {
    let repo = ProductRepository::new(state.pool());
    repo.get(id)
        .await?
        .filter(|p| p.is_active && p.phase == ProductPhase::Complete)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Pick the image for a color: the positional pairing when it exists,
/// otherwise the first image, otherwise empty.
fn image_for_color(product: &Product, color: &str) -> String {
    product
        .colors
        .iter()
        .position(|c| c == color)
        .and_then(|index| product.image_urls.get(index))
        .or_else(|| product.image_urls.first())
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product() -> Product {
        Product {
            id: ProductId::generate(),
            name: "Romper".to_string(),
            description: String::new(),
            price: Decimal::from(100),
            image_urls: vec!["/honey.jpg".to_string(), "/navy.jpg".to_string()],
            colors: vec!["Honey".to_string(), "Navy".to_string()],
            sizes: vec!["S".to_string()],
            stock_by_size: None,
            tags: vec![],
            is_active: true,
            phase: ProductPhase::Complete,
        }
    }

    #[test]
    fn image_follows_color_position() {
        let product = product();
        assert_eq!(image_for_color(&product, "Navy"), "/navy.jpg");
    }

    #[test]
    fn unknown_color_falls_back_to_first_image() {
        let product = product();
        assert_eq!(image_for_color(&product, "Pink"), "/honey.jpg");
    }

    #[test]
    fn imageless_product_yields_empty_url() {
        let mut product = product();
        product.image_urls.clear();
        assert_eq!(image_for_color(&product, "Honey"), "");
    }
}
