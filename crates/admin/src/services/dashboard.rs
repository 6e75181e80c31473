//! Dashboard aggregation over a window of recent orders.
//!
//! Pure computation: the route hands in whatever orders it loaded and gets
//! back the summary numbers. Revenue counts only money actually collected or
//! committed (paid and cash-on-delivery orders), not failed or abandoned
//! gateway attempts.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use marigold_core::{Order, OrderStatus, PaymentStatus};

/// Dashboard summary for the staff landing page.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_orders: usize,
    /// Sum of totals over revenue-bearing orders.
    pub gross_revenue: Decimal,
    /// `gross_revenue / revenue_orders`, zero when there are none.
    pub average_order_value: Decimal,
    /// Orders still waiting on payment or fulfilment.
    pub open_orders: usize,
    /// Orders placed in each of the last 7 days, oldest first.
    pub orders_last_7_days: [usize; 7],
}

/// Whether an order's money is (or will be) collected.
fn is_revenue(order: &Order) -> bool {
    order.payment_status == PaymentStatus::Paid || order.payment_status == PaymentStatus::Cod
}

/// Whether an order still needs staff or buyer action.
fn is_open(order: &Order) -> bool {
    matches!(
        order.status,
        OrderStatus::Created | OrderStatus::Pending | OrderStatus::CashOnDelivery
    )
}

/// Compute the dashboard summary from a slice of orders.
///
/// `now` is injected so the 7-day buckets are testable.
#[must_use]
pub fn compute_stats(orders: &[Order], now: DateTime<Utc>) -> DashboardStats {
    let revenue_orders: Vec<&Order> = orders.iter().filter(|o| is_revenue(o)).collect();

    let gross_revenue: Decimal = revenue_orders.iter().map(|o| o.total).sum();
    let average_order_value = if revenue_orders.is_empty() {
        Decimal::ZERO
    } else {
        gross_revenue / Decimal::from(revenue_orders.len())
    };

    let mut orders_last_7_days = [0_usize; 7];
    for order in orders {
        let age = now.signed_duration_since(order.created_at);
        if age < Duration::zero() || age >= Duration::days(7) {
            continue;
        }
        // Bucket 6 is today, bucket 0 is six days ago.
        let days_ago = usize::try_from(age.num_days()).unwrap_or(6).min(6);
        if let Some(bucket) = orders_last_7_days.get_mut(6 - days_ago) {
            *bucket += 1;
        }
    }

    DashboardStats {
        total_orders: orders.len(),
        gross_revenue,
        average_order_value,
        open_orders: orders.iter().filter(|o| is_open(o)).count(),
        orders_last_7_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marigold_core::{
        CurrencyCode, CustomerSummary, OrderId, PaymentMethod, PaymentProvider,
    };

    fn order(
        total: i64,
        status: OrderStatus,
        payment_status: PaymentStatus,
        days_ago: i64,
        now: DateTime<Utc>,
    ) -> Order {
        Order {
            id: OrderId::generate(),
            currency: CurrencyCode::EGP,
            subtotal: Decimal::from(total),
            shipping_cost: Decimal::ZERO,
            total: Decimal::from(total),
            items: vec![],
            customer: CustomerSummary {
                full_name: "Buyer".to_string(),
                phone: "+201000000000".to_string(),
                email: "buyer@example.com".to_string(),
                city: "Cairo".to_string(),
                area: "Maadi".to_string(),
            },
            status,
            payment_status,
            payment_method: PaymentMethod::Paymob,
            payment_provider: PaymentProvider::Paymob,
            gateway: None,
            version: 0,
            created_at: now - Duration::days(days_ago),
            updated_at: now - Duration::days(days_ago),
        }
    }

    #[test]
    fn revenue_counts_paid_and_cod_only() {
        let now = Utc::now();
        let orders = vec![
            order(100, OrderStatus::Paid, PaymentStatus::Paid, 0, now),
            order(200, OrderStatus::CashOnDelivery, PaymentStatus::Cod, 1, now),
            order(999, OrderStatus::Failed, PaymentStatus::Failed, 1, now),
            order(999, OrderStatus::Created, PaymentStatus::Unpaid, 2, now),
        ];

        let stats = compute_stats(&orders, now);
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.gross_revenue, Decimal::from(300));
        assert_eq!(stats.average_order_value, Decimal::from(150));
    }

    #[test]
    fn open_orders_are_those_awaiting_action() {
        let now = Utc::now();
        let orders = vec![
            order(100, OrderStatus::Created, PaymentStatus::Unpaid, 0, now),
            order(100, OrderStatus::Pending, PaymentStatus::Pending, 0, now),
            order(100, OrderStatus::CashOnDelivery, PaymentStatus::Cod, 0, now),
            order(100, OrderStatus::Fulfilled, PaymentStatus::Paid, 0, now),
            order(100, OrderStatus::Cancelled, PaymentStatus::Failed, 0, now),
        ];

        assert_eq!(compute_stats(&orders, now).open_orders, 3);
    }

    #[test]
    fn seven_day_buckets_run_oldest_to_newest() {
        let now = Utc::now();
        let orders = vec![
            order(100, OrderStatus::Paid, PaymentStatus::Paid, 0, now),
            order(100, OrderStatus::Paid, PaymentStatus::Paid, 0, now),
            order(100, OrderStatus::Paid, PaymentStatus::Paid, 6, now),
            // Outside the window, ignored by the buckets.
            order(100, OrderStatus::Paid, PaymentStatus::Paid, 10, now),
        ];

        let stats = compute_stats(&orders, now);
        assert_eq!(stats.orders_last_7_days, [1, 0, 0, 0, 0, 0, 2]);
        assert_eq!(stats.total_orders, 4);
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let stats = compute_stats(&[], Utc::now());
        assert_eq!(stats.gross_revenue, Decimal::ZERO);
        assert_eq!(stats.average_order_value, Decimal::ZERO);
        assert_eq!(stats.orders_last_7_days, [0; 7]);
    }
}
