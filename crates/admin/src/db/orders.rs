//! Order queries for the staff panel.
//!
//! Staff read every order; the only thing they write is the status pair, and
//! that write is versioned so two sessions editing the same order cannot
//! silently overwrite each other.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use marigold_core::{
    CurrencyCode, CustomerSummary, GatewayRefs, Order, OrderId, OrderItem, OrderStatus,
    PaymentStatus, ShippingAddress,
};

use super::RepositoryError;

/// Repository for staff order reads and status writes.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

/// Raw order row as stored.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    currency: String,
    subtotal: Decimal,
    shipping_cost: Decimal,
    total: Decimal,
    items: Json<Vec<OrderItem>>,
    status: String,
    payment_status: String,
    payment_method: String,
    payment_provider: String,
    gateway_order_id: Option<i64>,
    merchant_order_ref: Option<String>,
    customer_name: String,
    customer_phone: String,
    customer_email: String,
    customer_city: String,
    customer_area: String,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let corrupt =
            |field: &str, err: String| RepositoryError::DataCorruption(format!("{field}: {err}"));

        let gateway = match (self.gateway_order_id, self.merchant_order_ref) {
            (Some(gateway_order_id), Some(merchant_order_ref)) => Some(GatewayRefs {
                gateway_order_id,
                merchant_order_ref,
            }),
            _ => None,
        };

        Ok(Order {
            id: OrderId::new(self.id),
            currency: self
                .currency
                .parse::<CurrencyCode>()
                .map_err(|e| corrupt("currency", e))?,
            subtotal: self.subtotal,
            shipping_cost: self.shipping_cost,
            total: self.total,
            items: self.items.0,
            customer: CustomerSummary {
                full_name: self.customer_name,
                phone: self.customer_phone,
                email: self.customer_email,
                city: self.customer_city,
                area: self.customer_area,
            },
            status: self.status.parse().map_err(|e| corrupt("status", e))?,
            payment_status: self
                .payment_status
                .parse()
                .map_err(|e| corrupt("payment_status", e))?,
            payment_method: self
                .payment_method
                .parse()
                .map_err(|e| corrupt("payment_method", e))?,
            payment_provider: self
                .payment_provider
                .parse()
                .map_err(|e| corrupt("payment_provider", e))?,
            gateway,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ORDER: &str = "\
    SELECT id, currency, subtotal, shipping_cost, total, items, status, \
           payment_status, payment_method, payment_provider, gateway_order_id, \
           merchant_order_ref, customer_name, customer_phone, customer_email, \
           customer_city, customer_area, version, created_at, updated_at \
    FROM orders";

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if a stored status fails to parse.
    pub async fn list(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("{SELECT_ORDER} ORDER BY created_at DESC LIMIT $1"))
                .bind(limit)
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Fetch one order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{SELECT_ORDER} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(self.pool)
            .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Fetch the shipping-address child of an order, if it was written.
    ///
    /// An order without one is the known mid-checkout failure shape; the
    /// caller decides how to present it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_shipping_address(
        &self,
        id: OrderId,
    ) -> Result<Option<ShippingAddress>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct AddressRow {
            full_name: String,
            phone: String,
            email: Option<String>,
            city: String,
            area: String,
            street_address: String,
            building: Option<String>,
            apartment: Option<String>,
            floor: Option<String>,
            notes: Option<String>,
        }

        let row: Option<AddressRow> = sqlx::query_as(
            "SELECT full_name, phone, email, city, area, street_address, building, apartment, \
             floor, notes \
             FROM order_shipping_addresses WHERE order_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| ShippingAddress {
            full_name: r.full_name,
            phone: r.phone,
            email: r.email,
            city: r.city,
            area: r.area,
            street_address: r.street_address,
            building: r.building,
            apartment: r.apartment,
            floor: r.floor,
            notes: r.notes,
        }))
    }

    /// Versioned status write: check-and-increment the version column.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` on a version mismatch or a missing order,
    /// `Database`/`DataCorruption` otherwise.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        payment_status: PaymentStatus,
        expected_version: i32,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            "UPDATE orders \
             SET status = $2, payment_status = $3, version = version + 1, updated_at = now() \
             WHERE id = $1 AND version = $4 \
             RETURNING id, currency, subtotal, shipping_cost, total, items, status, \
                       payment_status, payment_method, payment_provider, gateway_order_id, \
                       merchant_order_ref, customer_name, customer_phone, customer_email, \
                       customer_city, customer_area, version, created_at, updated_at",
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(payment_status.as_str())
        .bind(expected_version)
        .fetch_optional(self.pool)
        .await?;

        row.map_or(Err(RepositoryError::Conflict), OrderRow::into_order)
    }
}
