//! Card payment routes: the gateway flow start and its return leg.
//!
//! Starting the flow is idempotent over the gateway order: the first attempt
//! registers one and stores the reference, any later attempt reuses it and
//! only mints a fresh payment token. The return leg trusts the redirect
//! parameters just enough to record an outcome; anything ambiguous leaves the
//! order untouched for staff to resolve.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use marigold_core::{GatewayRefs, Money, OrderId, OrderStatus, PaymentMethod, PaymentStatus};

use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::services::paymob::{BillingData, PaymobError};
use crate::state::AppState;

/// Query parameters for starting the card flow.
#[derive(Debug, Deserialize)]
pub struct StartParams {
    pub order_id: OrderId,
}

/// Response pointing the buyer at the hosted payment page.
#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub order_id: OrderId,
    pub iframe_url: String,
}

/// GET /api/checkout/paymob?order_id=...
#[instrument(skip(state), fields(order_id = %params.order_id))]
pub async fn start(
    State(state): State<AppState>,
    Query(params): Query<StartParams>,
) -> Result<Json<StartResponse>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(params.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", params.order_id)))?;

    if order.payment_method != PaymentMethod::Paymob {
        return Err(AppError::BadRequest(
            "order is not a card payment order".into(),
        ));
    }
    if order.payment_status == PaymentStatus::Paid {
        return Err(AppError::BadRequest("order is already paid".into()));
    }

    let amount_cents = Money::new(order.total, order.currency)
        .minor_units()
        .ok_or(AppError::Gateway(PaymobError::AmountOutOfRange))?;

    let paymob = state.paymob();
    let auth_token = paymob.authenticate().await?;

    let gateway_order_id = match gateway_order_action(order.gateway.as_ref()) {
        GatewayOrderAction::Reuse(id) => {
            tracing::debug!(gateway_order_id = id, "reusing registered gateway order");
            id
        }
        GatewayOrderAction::Register => {
            let merchant_order_ref = merchant_ref(order.id);
            let gateway_order_id = paymob
                .register_order(
                    &auth_token,
                    amount_cents,
                    order.currency.code(),
                    &merchant_order_ref,
                )
                .await?;

            repo.store_gateway_refs(
                order.id,
                &GatewayRefs {
                    gateway_order_id,
                    merchant_order_ref,
                },
            )
            .await?;

            tracing::info!(gateway_order_id, "gateway order registered");
            gateway_order_id
        }
    };

    let shipping = repo.get_shipping_address(order.id).await?;
    let billing = BillingData::derive(&order.customer, shipping.as_ref());

    let redirection_url = format!(
        "{}/checkout/return?order_id={}",
        state.config().base_url,
        order.id
    );

    let payment_token = paymob
        .payment_key(
            &auth_token,
            amount_cents,
            gateway_order_id,
            order.currency.code(),
            &billing,
            &redirection_url,
        )
        .await?;

    Ok(Json(StartResponse {
        order_id: order.id,
        iframe_url: paymob.iframe_url(&payment_token),
    }))
}

/// Query parameters the gateway appends on redirect. Everything is optional;
/// buyers land here with whatever the gateway (or a bookmark) sent.
#[derive(Debug, Deserialize)]
pub struct ReturnParams {
    pub order_id: OrderId,
    pub success: Option<String>,
}

/// Persisted order state reported back to the buyer.
#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// GET /checkout/return?order_id=...&success=...
///
/// Records the redirect outcome, then reports whatever is actually persisted.
/// A lost status-write race is logged and swallowed: the concurrent writer's
/// result stands.
#[instrument(skip(state), fields(order_id = %params.order_id))]
pub async fn gateway_return(
    State(state): State<AppState>,
    Query(params): Query<ReturnParams>,
) -> Result<Json<ReturnResponse>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(params.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", params.order_id)))?;

    if let Some((status, payment_status)) = reconcile_outcome(params.success.as_deref()) {
        match repo
            .update_status(order.id, status, payment_status, order.version)
            .await
        {
            Ok(updated) => {
                tracing::info!(status = %updated.status, "payment outcome recorded");
            }
            Err(RepositoryError::Conflict) => {
                tracing::warn!("payment outcome write lost a concurrent update");
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        tracing::warn!(
            success = params.success.as_deref().unwrap_or("<absent>"),
            "ambiguous gateway redirect, order left untouched"
        );
    }

    // Report the persisted state, not what this request tried to write.
    let current = repo
        .get(params.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", params.order_id)))?;

    Ok(Json(ReturnResponse {
        order_id: current.id,
        status: current.status,
        payment_status: current.payment_status,
    }))
}

/// Merchant correlation id, unique across retries of the same order.
fn merchant_ref(order_id: OrderId) -> String {
    format!("marigold_{}_{}", order_id, Utc::now().timestamp_millis())
}

/// What to do about the gateway order on this attempt.
#[derive(Debug, PartialEq, Eq)]
enum GatewayOrderAction {
    /// A reference is already stored; reuse it, never register a second.
    Reuse(i64),
    /// First attempt: register a gateway order and store the reference.
    Register,
}

/// Decide between registering a gateway order and reusing the stored one.
///
/// Together with the write-once guard in the repository this keeps an order
/// at exactly one gateway reference no matter how often the flow restarts.
const fn gateway_order_action(existing: Option<&GatewayRefs>) -> GatewayOrderAction {
    match existing {
        Some(refs) => GatewayOrderAction::Reuse(refs.gateway_order_id),
        None => GatewayOrderAction::Register,
    }
}

/// Map the redirect's `success` parameter to a status pair.
///
/// Only the literal strings `"true"` and `"false"` mean anything; an absent
/// or unrecognized value yields `None` and the order is not written at all.
fn reconcile_outcome(success: Option<&str>) -> Option<(OrderStatus, PaymentStatus)> {
    match success {
        Some("true") => Some((OrderStatus::Paid, PaymentStatus::Paid)),
        Some("false") => Some((OrderStatus::Failed, PaymentStatus::Failed)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_true_records_paid() {
        assert_eq!(
            reconcile_outcome(Some("true")),
            Some((OrderStatus::Paid, PaymentStatus::Paid))
        );
    }

    #[test]
    fn explicit_false_records_failed() {
        assert_eq!(
            reconcile_outcome(Some("false")),
            Some((OrderStatus::Failed, PaymentStatus::Failed))
        );
    }

    #[test]
    fn anything_else_writes_nothing() {
        assert_eq!(reconcile_outcome(None), None);
        assert_eq!(reconcile_outcome(Some("")), None);
        assert_eq!(reconcile_outcome(Some("TRUE")), None);
        assert_eq!(reconcile_outcome(Some("1")), None);
        assert_eq!(reconcile_outcome(Some("yes")), None);
    }

    #[test]
    fn second_start_reuses_the_stored_gateway_order() {
        // First attempt: nothing stored, so a gateway order gets registered.
        assert_eq!(gateway_order_action(None), GatewayOrderAction::Register);

        // The reference the first attempt stored.
        let refs = GatewayRefs {
            gateway_order_id: 9001,
            merchant_order_ref: merchant_ref(OrderId::generate()),
        };

        // Every later attempt reuses it; no second registration.
        assert_eq!(
            gateway_order_action(Some(&refs)),
            GatewayOrderAction::Reuse(9001)
        );
    }

    #[test]
    fn merchant_refs_embed_the_order_id() {
        let id = OrderId::generate();
        let reference = merchant_ref(id);
        assert!(reference.starts_with("marigold_"));
        assert!(reference.contains(&id.to_string()));
    }
}
