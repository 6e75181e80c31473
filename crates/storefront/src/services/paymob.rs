//! Paymob gateway client for the card checkout flow.
//!
//! Three sequential calls, none retried automatically:
//!
//! 1. auth-token exchange (static API key -> short-lived bearer token)
//! 2. gateway order registration (amount in minor units, currency, unique
//!    merchant correlation id) - skipped entirely when the order already
//!    carries a gateway reference
//! 3. payment-key issuance (amount, gateway order id, integration id,
//!    billing data) -> embedded in the iframe redirect URL
//!
//! A failure at any step aborts the whole attempt with the provider's error
//! payload; the buyer restarts checkout, which reuses the gateway order but
//! requests a fresh payment token.

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use marigold_core::{CustomerSummary, ShippingAddress};

use crate::config::PaymobConfig;

/// Payment token validity window, enforced by the gateway.
const TOKEN_EXPIRATION_SECONDS: u32 = 3600;

/// Country dialing prefix applied to normalized phone numbers.
const PHONE_PREFIX: &str = "+20";

/// Placeholder surname for single-token buyer names.
const PLACEHOLDER_SURNAME: &str = "Marigold";

/// Fallbacks so the gateway never receives empty required billing fields.
const FALLBACK_PHONE: &str = "01000000000";
const FALLBACK_EMAIL: &str = "customer@marigoldkids.shop";
const FALLBACK_CITY: &str = "Cairo";
const FALLBACK_FIELD: &str = "N/A";

/// Errors that can occur when talking to the gateway.
#[derive(Debug, Error)]
pub enum PaymobError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned a non-success response at one of the steps.
    #[error("{step} failed: {status} - {message}")]
    Api {
        step: &'static str,
        status: u16,
        message: String,
    },

    /// Failed to parse a gateway response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The order total does not fit in minor units.
    #[error("amount out of range")]
    AmountOutOfRange,
}

impl PaymobError {
    /// Message safe to show to the buyer.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Api { step, .. } => format!("Payment provider rejected the {step} step"),
            Self::AmountOutOfRange => "Order total cannot be charged".to_string(),
            Self::Http(_) | Self::Parse(_) => "Payment provider unavailable".to_string(),
        }
    }
}

/// Billing fields the gateway requires with every payment key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingData {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub street: String,
    pub building: String,
    pub floor: String,
    pub apartment: String,
    pub city: String,
    pub state: String,
}

impl BillingData {
    /// Derive billing fields from the order's customer summary and its
    /// shipping record, substituting fixed placeholders for anything blank.
    ///
    /// The shipping record wins over the denormalized customer fields when
    /// both are present; a missing record (the known order-without-address
    /// gap) falls back to the summary alone.
    #[must_use]
    pub fn derive(customer: &CustomerSummary, shipping: Option<&ShippingAddress>) -> Self {
        let (first_name, last_name) = split_name(&customer.full_name);

        let pick = |from_shipping: Option<&str>, from_customer: &str, fallback: &str| {
            non_empty(from_shipping.unwrap_or(from_customer), fallback)
        };

        let phone = normalize_phone(&pick(
            shipping.map(|s| s.phone.as_str()),
            &customer.phone,
            FALLBACK_PHONE,
        ));

        Self {
            first_name,
            last_name,
            phone_number: phone,
            email: pick(
                shipping.and_then(|s| s.email.as_deref()),
                &customer.email,
                FALLBACK_EMAIL,
            ),
            street: non_empty(
                shipping.map_or("", |s| s.street_address.as_str()),
                FALLBACK_FIELD,
            ),
            building: non_empty(
                shipping.and_then(|s| s.building.as_deref()).unwrap_or(""),
                FALLBACK_FIELD,
            ),
            floor: non_empty(
                shipping.and_then(|s| s.floor.as_deref()).unwrap_or(""),
                FALLBACK_FIELD,
            ),
            apartment: non_empty(
                shipping.and_then(|s| s.apartment.as_deref()).unwrap_or(""),
                FALLBACK_FIELD,
            ),
            city: pick(
                shipping.map(|s| s.city.as_str()),
                &customer.city,
                FALLBACK_CITY,
            ),
            state: pick(
                shipping.map(|s| s.area.as_str()),
                &customer.area,
                FALLBACK_CITY,
            ),
        }
    }
}

/// Split a full name into gateway first/last fields.
///
/// Single-token names get the fixed placeholder surname; an empty name gets
/// a generic pair so the gateway never sees a blank.
#[must_use]
pub fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    match parts.next() {
        None => ("Customer".to_string(), PLACEHOLDER_SURNAME.to_string()),
        Some(first) => {
            let rest = parts.collect::<Vec<_>>().join(" ");
            if rest.is_empty() {
                (first.to_string(), PLACEHOLDER_SURNAME.to_string())
            } else {
                (first.to_string(), rest)
            }
        }
    }
}

/// Normalize a phone number to the country-prefixed form.
///
/// Already-prefixed numbers pass through, a leading zero is substituted by
/// the prefix, bare numbers get the prefix prepended.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return format!("{PHONE_PREFIX}1000000000");
    }
    if trimmed.starts_with('+') {
        return trimmed.to_string();
    }
    if let Some(rest) = trimmed.strip_prefix('0') {
        return format!("{PHONE_PREFIX}{rest}");
    }
    format!("{PHONE_PREFIX}{trimmed}")
}

/// Replace a blank value with a fixed placeholder.
fn non_empty(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct PaymentKeyResponse {
    token: String,
}

/// Paymob API client.
#[derive(Clone)]
pub struct PaymobClient {
    client: Client,
    config: PaymobConfig,
}

impl PaymobClient {
    /// Create a new gateway client.
    #[must_use]
    pub fn new(config: PaymobConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Exchange the static API key for a short-lived auth token.
    ///
    /// # Errors
    ///
    /// Returns `PaymobError::Api` on a non-success response.
    pub async fn authenticate(&self) -> Result<String, PaymobError> {
        let url = format!("{}/auth/tokens", self.config.base_url);
        let body = serde_json::json!({
            "api_key": self.config.api_key.expose_secret(),
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymobError::Api {
                step: "auth",
                status: status.as_u16(),
                message,
            });
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| PaymobError::Parse(e.to_string()))?;
        Ok(auth.token)
    }

    /// Register a gateway-side order for the given amount.
    ///
    /// The merchant correlation id must be unique across retries; the caller
    /// builds it from the order id plus a creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns `PaymobError::Api` on a non-success response.
    pub async fn register_order(
        &self,
        auth_token: &str,
        amount_cents: i64,
        currency: &str,
        merchant_order_ref: &str,
    ) -> Result<i64, PaymobError> {
        let url = format!("{}/ecommerce/orders", self.config.base_url);
        let body = serde_json::json!({
            "auth_token": auth_token,
            "delivery_needed": false,
            "amount_cents": amount_cents.to_string(),
            "currency": currency,
            "merchant_order_id": merchant_order_ref,
            "items": [],
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymobError::Api {
                step: "order registration",
                status: status.as_u16(),
                message,
            });
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| PaymobError::Parse(e.to_string()))?;
        Ok(order.id)
    }

    /// Request a payment token scoped to a gateway order.
    ///
    /// A fresh token is issued on every call - retrying checkout reuses the
    /// gateway order but never a token.
    ///
    /// # Errors
    ///
    /// Returns `PaymobError::Api` on a non-success response.
    pub async fn payment_key(
        &self,
        auth_token: &str,
        amount_cents: i64,
        gateway_order_id: i64,
        currency: &str,
        billing: &BillingData,
        redirection_url: &str,
    ) -> Result<String, PaymobError> {
        let url = format!("{}/acceptance/payment_keys", self.config.base_url);
        let body = serde_json::json!({
            "auth_token": auth_token,
            "amount_cents": amount_cents.to_string(),
            "expiration": TOKEN_EXPIRATION_SECONDS,
            "order_id": gateway_order_id,
            "currency": currency,
            "integration_id": self.config.integration_id,
            "lock_order_when_paid": true,
            "redirection_url": redirection_url,
            "billing_data": {
                "first_name": billing.first_name,
                "last_name": billing.last_name,
                "phone_number": billing.phone_number,
                "email": billing.email,
                "street": billing.street,
                "building": billing.building,
                "floor": billing.floor,
                "apartment": billing.apartment,
                "city": billing.city,
                "state": billing.state,
                "country": "EG",
                "postal_code": "00000",
                "shipping_method": "PKG",
            },
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymobError::Api {
                step: "payment key",
                status: status.as_u16(),
                message,
            });
        }

        let key: PaymentKeyResponse = response
            .json()
            .await
            .map_err(|e| PaymobError::Parse(e.to_string()))?;
        Ok(key.token)
    }

    /// Build the buyer-visible iframe redirect URL for a payment token.
    #[must_use]
    pub fn iframe_url(&self, payment_token: &str) -> String {
        format!(
            "{}/acceptance/iframes/{}?payment_token={}",
            self.config.base_url,
            self.config.iframe_id,
            urlencoding::encode(payment_token)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> CustomerSummary {
        CustomerSummary {
            full_name: "Nour Hassan".to_string(),
            phone: "01012345678".to_string(),
            email: "nour@example.com".to_string(),
            city: "Cairo".to_string(),
            area: "Maadi".to_string(),
        }
    }

    #[test]
    fn split_name_handles_multi_token_names() {
        assert_eq!(
            split_name("Nour El Din Hassan"),
            ("Nour".to_string(), "El Din Hassan".to_string())
        );
    }

    #[test]
    fn split_name_gives_single_token_names_a_placeholder_surname() {
        assert_eq!(
            split_name("Nour"),
            ("Nour".to_string(), PLACEHOLDER_SURNAME.to_string())
        );
    }

    #[test]
    fn split_name_handles_blank_input() {
        assert_eq!(
            split_name("   "),
            ("Customer".to_string(), PLACEHOLDER_SURNAME.to_string())
        );
    }

    #[test]
    fn phone_with_prefix_passes_through() {
        assert_eq!(normalize_phone("+201012345678"), "+201012345678");
    }

    #[test]
    fn phone_leading_zero_is_replaced_by_prefix() {
        assert_eq!(normalize_phone("01012345678"), "+201012345678");
    }

    #[test]
    fn bare_phone_gets_prefix_prepended() {
        assert_eq!(normalize_phone("1012345678"), "+201012345678");
    }

    #[test]
    fn billing_prefers_shipping_record_over_summary() {
        let shipping = ShippingAddress {
            full_name: "Nour Hassan".to_string(),
            phone: "01198765432".to_string(),
            email: Some("other@example.com".to_string()),
            city: "Giza".to_string(),
            area: "Dokki".to_string(),
            street_address: "5 Tahrir St".to_string(),
            building: Some("12".to_string()),
            apartment: None,
            floor: None,
            notes: None,
        };

        let billing = BillingData::derive(&customer(), Some(&shipping));
        assert_eq!(billing.phone_number, "+201198765432");
        assert_eq!(billing.email, "other@example.com");
        assert_eq!(billing.city, "Giza");
        assert_eq!(billing.state, "Dokki");
        assert_eq!(billing.street, "5 Tahrir St");
        assert_eq!(billing.building, "12");
        // Missing optionals become fixed placeholders, never empty strings.
        assert_eq!(billing.apartment, FALLBACK_FIELD);
        assert_eq!(billing.floor, FALLBACK_FIELD);
    }

    #[test]
    fn billing_falls_back_to_customer_summary_without_shipping_record() {
        let billing = BillingData::derive(&customer(), None);
        assert_eq!(billing.first_name, "Nour");
        assert_eq!(billing.last_name, "Hassan");
        assert_eq!(billing.phone_number, "+201012345678");
        assert_eq!(billing.email, "nour@example.com");
        assert_eq!(billing.street, FALLBACK_FIELD);
    }

    #[test]
    fn billing_never_emits_empty_required_fields() {
        let empty_customer = CustomerSummary {
            full_name: String::new(),
            phone: String::new(),
            email: String::new(),
            city: String::new(),
            area: String::new(),
        };

        let billing = BillingData::derive(&empty_customer, None);
        assert!(!billing.first_name.is_empty());
        assert!(!billing.last_name.is_empty());
        assert_eq!(billing.phone_number, "+201000000000");
        assert_eq!(billing.email, FALLBACK_EMAIL);
        assert_eq!(billing.city, FALLBACK_CITY);
        assert_eq!(billing.state, FALLBACK_CITY);
    }
}
