//! Type-safe money representation using decimal arithmetic.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// An amount of money with its currency.
///
/// Amounts are held in the currency's standard unit (pounds, not piastres)
/// as a [`Decimal`]. The payment gateway wants minor units, which
/// [`Money::minor_units`] computes by rounding `amount * 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// The amount in minor units (piastres/cents), rounded half-up.
    ///
    /// Returns `None` if the amount does not fit in an `i64` after scaling,
    /// which cannot happen for any total this shop will ever see.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        (self.amount * Decimal::from(100)).round().to_i64()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency.code())
    }
}

/// ISO 4217 currency codes.
///
/// The shop trades in a single currency; the enum exists so the wire format
/// and database column stay honest about which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EGP,
    USD,
}

impl CurrencyCode {
    /// The ISO 4217 code string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EGP => "EGP",
            Self::USD => "USD",
        }
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EGP" => Ok(Self::EGP),
            "USD" => Ok(Self::USD),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_rounds_half_up() {
        let money = Money::new(Decimal::new(19995, 3), CurrencyCode::EGP); // 19.995
        assert_eq!(money.minor_units(), Some(2000));
    }

    #[test]
    fn minor_units_for_whole_amounts() {
        let money = Money::new(Decimal::from(200), CurrencyCode::EGP);
        assert_eq!(money.minor_units(), Some(20000));
    }

    #[test]
    fn display_includes_code() {
        let money = Money::new(Decimal::new(1050, 2), CurrencyCode::EGP);
        assert_eq!(money.to_string(), "10.50 EGP");
    }
}
