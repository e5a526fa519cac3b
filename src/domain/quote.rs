//! Point-in-time price snapshot for a tradable symbol.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Symbol;

/// A price quote for one symbol.
///
/// Immutable value type: a refresh replaces the whole quote, fields are
/// never partially mutated. Serializes with camelCase field names so the
/// in-memory shape mirrors the stored document shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// The symbol this quote is for.
    pub symbol: Symbol,
    /// Most recent trade price.
    pub latest_price: Decimal,
    /// Absolute change since the previous close.
    pub change: Decimal,
    /// Relative change since the previous close.
    pub change_percent: Decimal,
    /// Closing price of the previous session.
    pub previous_close: Decimal,
    /// ISO currency code of the prices.
    pub currency: String,
    /// When the upstream provider produced this quote.
    pub update_time: DateTime<Utc>,
}

impl Quote {
    /// Create a quote with the change fields derived from the prices.
    pub fn new(
        symbol: impl Into<Symbol>,
        latest_price: Decimal,
        previous_close: Decimal,
        currency: impl Into<String>,
        update_time: DateTime<Utc>,
    ) -> Self {
        let change = latest_price - previous_close;
        let change_percent = if previous_close.is_zero() {
            Decimal::ZERO
        } else {
            change / previous_close
        };
        Self {
            symbol: symbol.into(),
            latest_price,
            change,
            change_percent,
            previous_close,
            currency: currency.into(),
            update_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn derives_change_fields() {
        let q = Quote::new("AAPL", dec!(110), dec!(100), "USD", Utc::now());
        assert_eq!(q.change, dec!(10));
        assert_eq!(q.change_percent, dec!(0.1));
    }

    #[test]
    fn zero_previous_close_has_zero_change_percent() {
        let q = Quote::new("NEWIPO", dec!(25), dec!(0), "USD", Utc::now());
        assert_eq!(q.change_percent, Decimal::ZERO);
    }

    #[test]
    fn serializes_camel_case() {
        let q = Quote::new("MSFT", dec!(410.25), dec!(400), "USD", Utc::now());
        let value = serde_json::to_value(&q).unwrap();
        assert!(value.get("latestPrice").is_some());
        assert!(value.get("previousClose").is_some());
        assert!(value.get("updateTime").is_some());
    }
}
