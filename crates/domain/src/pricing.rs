//! Checkout arithmetic.
//!
//! The total of an order is always the sum of its line totals plus the
//! delivery fee in effect when it was placed.

use std::str::FromStr;

use common::Money;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// Reads the delivery fee out of the raw `delivery_fee` setting.
///
/// Accepts a bare number, a numeric string, or an object with an `amount`
/// field holding either. Anything else, including a negative amount, reads
/// as zero.
pub fn delivery_fee_from_setting(value: Option<&Value>) -> Money {
    let amount = match value {
        Some(Value::Object(map)) => map.get("amount").and_then(decimal_from_value),
        Some(other) => decimal_from_value(other),
        None => None,
    };

    match amount {
        Some(amount) if amount >= Decimal::ZERO => Money::new(amount).round(),
        _ => Money::zero(),
    }
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Price breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderQuote {
    pub items_total: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl OrderQuote {
    /// Prices `(unit price, quantity)` lines.
    pub fn new<I>(lines: I, delivery_fee: Money) -> Self
    where
        I: IntoIterator<Item = (Money, u32)>,
    {
        let items_total: Money = lines
            .into_iter()
            .map(|(price, quantity)| price.multiply(quantity))
            .sum();

        Self {
            items_total,
            delivery_fee,
            total: items_total + delivery_fee,
        }
    }
}
