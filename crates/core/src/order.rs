//! Order composition: snapshotting a cart + address into an immutable order.
//!
//! An order is created exactly once. Its items, totals and customer summary
//! are frozen at creation; only the status fields (and the gateway reference,
//! set at most once) change afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::{
    CurrencyCode, Email, OrderId, OrderStatus, PaymentMethod, PaymentProvider, PaymentStatus,
    ProductId,
};

/// The buyer's shipping address as entered at checkout.
///
/// Held only in the checkout flow - never written into the session slot - and
/// persisted as a one-to-one child record of the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub city: String,
    pub area: String,
    pub street_address: String,
    pub building: Option<String>,
    pub apartment: Option<String>,
    pub floor: Option<String>,
    pub notes: Option<String>,
}

/// Quick customer fields denormalized onto the order for list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub area: String,
}

impl CustomerSummary {
    fn from_address(address: &ShippingAddress) -> Self {
        Self {
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            email: address.email.clone().unwrap_or_default(),
            city: address.city.clone(),
            area: address.area.clone(),
        }
    }
}

/// A frozen order line, deep-copied from the cart with its total baked in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub image_url: String,
    pub color: String,
    pub size: String,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Everything needed to persist a new order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub currency: CurrencyCode,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    pub customer: CustomerSummary,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_provider: PaymentProvider,
}

/// Reference to the gateway's own order object, set at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRefs {
    /// The gateway-assigned order id.
    pub gateway_order_id: i64,
    /// Merchant-generated correlation id, unique across retries.
    pub merchant_order_ref: String,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub currency: CurrencyCode,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    pub customer: CustomerSummary,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_provider: PaymentProvider,
    pub gateway: Option<GatewayRefs>,
    /// Incremented on every status write; optimistic-concurrency check.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validation failures when composing an order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,
    /// A required shipping field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// The email does not look like `local@domain.tld`.
    #[error("invalid email address")]
    InvalidEmail,
}

/// Required shipping fields, checked in order.
fn required_fields(address: &ShippingAddress) -> [(&'static str, &str); 5] {
    [
        ("full_name", address.full_name.as_str()),
        ("phone", address.phone.as_str()),
        ("city", address.city.as_str()),
        ("area", address.area.as_str()),
        ("street_address", address.street_address.as_str()),
    ]
}

impl NewOrder {
    /// Compose an order from the cart and shipping details.
    ///
    /// Fails if the cart is empty, any required address field is blank, or
    /// the email fails the basic shape check. On success the cart lines are
    /// deep-copied with `line_total` baked in and the initial status pair is
    /// chosen by payment method: COD is terminal-ish from the start, the
    /// gateway branch starts `created`/`unpaid`.
    ///
    /// Clearing the cart and the in-session address is the caller's job,
    /// after the order has actually been persisted.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] as described above.
    pub fn compose(
        cart: &Cart,
        address: &ShippingAddress,
        shipping_cost: Decimal,
        payment_method: PaymentMethod,
    ) -> Result<Self, ValidationError> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }

        for (name, value) in required_fields(address) {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }

        let email = address.email.as_deref().unwrap_or("");
        if email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if Email::parse(email.trim()).is_err() {
            return Err(ValidationError::InvalidEmail);
        }

        let items: Vec<OrderItem> = cart
            .items()
            .iter()
            .map(|item| OrderItem {
                product_id: item.product_id,
                name: item.name.clone(),
                unit_price: item.unit_price,
                image_url: item.image_url.clone(),
                color: item.color.clone(),
                size: item.size.clone(),
                quantity: item.quantity,
                line_total: item.line_total(),
            })
            .collect();

        let subtotal = cart.subtotal();
        let total = subtotal + shipping_cost;

        let (status, payment_status, payment_provider) = match payment_method {
            PaymentMethod::Cod => (
                OrderStatus::CashOnDelivery,
                PaymentStatus::Cod,
                PaymentProvider::CashOnDelivery,
            ),
            PaymentMethod::Paymob => (
                OrderStatus::Created,
                PaymentStatus::Unpaid,
                PaymentProvider::Paymob,
            ),
        };

        Ok(Self {
            currency: CurrencyCode::default(),
            subtotal,
            shipping_cost,
            total,
            items,
            customer: CustomerSummary::from_address(address),
            status,
            payment_status,
            payment_method,
            payment_provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartItem;

    fn valid_address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Nour Hassan".to_string(),
            phone: "01012345678".to_string(),
            email: Some("nour@example.com".to_string()),
            city: "Cairo".to_string(),
            area: "Maadi".to_string(),
            street_address: "12 Road 9".to_string(),
            building: Some("4".to_string()),
            apartment: None,
            floor: None,
            notes: None,
        }
    }

    fn cart_with_one_line() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(
            ProductId::generate(),
            "Onesie",
            Decimal::from(100),
            "/img.jpg",
            "Blue",
            "M",
            2,
        ));
        cart
    }

    #[test]
    fn empty_cart_always_fails_regardless_of_address() {
        let result = NewOrder::compose(
            &Cart::new(),
            &valid_address(),
            Decimal::ZERO,
            PaymentMethod::Cod,
        );
        assert_eq!(result, Err(ValidationError::EmptyCart));
    }

    #[test]
    fn blank_required_field_fails_validation() {
        let mut address = valid_address();
        address.city = "   ".to_string();
        let result = NewOrder::compose(
            &cart_with_one_line(),
            &address,
            Decimal::ZERO,
            PaymentMethod::Cod,
        );
        assert_eq!(result, Err(ValidationError::MissingField("city")));
    }

    #[test]
    fn missing_email_fails_validation() {
        let mut address = valid_address();
        address.email = None;
        let result = NewOrder::compose(
            &cart_with_one_line(),
            &address,
            Decimal::ZERO,
            PaymentMethod::Cod,
        );
        assert_eq!(result, Err(ValidationError::MissingField("email")));
    }

    #[test]
    fn malformed_email_fails_validation() {
        let mut address = valid_address();
        address.email = Some("nour@nowhere".to_string());
        let result = NewOrder::compose(
            &cart_with_one_line(),
            &address,
            Decimal::ZERO,
            PaymentMethod::Paymob,
        );
        assert_eq!(result, Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn cod_order_starts_in_the_absorbing_cod_state() {
        let order = NewOrder::compose(
            &cart_with_one_line(),
            &valid_address(),
            Decimal::ZERO,
            PaymentMethod::Cod,
        )
        .expect("valid order");

        assert_eq!(order.status, OrderStatus::CashOnDelivery);
        assert_eq!(order.payment_status, PaymentStatus::Cod);
        assert_eq!(order.payment_provider, PaymentProvider::CashOnDelivery);
    }

    #[test]
    fn gateway_order_totals_and_initial_states() {
        // Cart [{color: Blue, size: M, quantity: 2, unit_price: 100}], shipping 0.
        let order = NewOrder::compose(
            &cart_with_one_line(),
            &valid_address(),
            Decimal::ZERO,
            PaymentMethod::Paymob,
        )
        .expect("valid order");

        assert_eq!(order.subtotal, Decimal::from(200));
        assert_eq!(order.total, Decimal::from(200));
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].line_total, Decimal::from(200));
        assert_eq!(order.customer.full_name, "Nour Hassan");
    }

    #[test]
    fn shipping_cost_is_added_to_the_total() {
        let order = NewOrder::compose(
            &cart_with_one_line(),
            &valid_address(),
            Decimal::from(50),
            PaymentMethod::Paymob,
        )
        .expect("valid order");

        assert_eq!(order.subtotal, Decimal::from(200));
        assert_eq!(order.total, Decimal::from(250));
    }
}
