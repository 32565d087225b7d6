//! Discounted-price computation
//!
//! The discount formula exists in two forms: a plain function (response
//! serialization and the in-memory price comparator) and a SurrealQL
//! expression (computed-field projection and range matching inside the
//! store). Both forms live in this module and must stay in lock-step.
//!
//! Formula: `price * (1 - amount/100)` for percentage discounts,
//! `price - amount` for absolute discounts, `price` when no discount
//! amount is set. The result is rounded half-away-from-zero to 2 decimal
//! places and clamped at 0.
//!
//! Uses rust_decimal for precision calculations.

use crate::db::models::{Discount, DiscountType};
use rust_decimal::prelude::*;

/// Rounding for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

// ==================== Conversion Helpers ====================

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

// ==================== Plain Form ====================

/// Effective price of an item after its discount, if any
pub fn discounted_price(price: f64, discount: Option<&Discount>) -> f64 {
    let base = to_decimal(price);

    let value = match discount {
        Some(d) if d.amount != 0.0 => match d.kind {
            DiscountType::Percentage => {
                base - base * to_decimal(d.amount) / Decimal::ONE_HUNDRED
            }
            DiscountType::Absolute => base - to_decimal(d.amount),
        },
        _ => base,
    };

    to_f64(value.max(Decimal::ZERO))
}

/// Whether the discount actually changes the price
pub fn has_discount(price: f64, discount: Option<&Discount>) -> bool {
    discounted_price(price, discount) != price
}

// ==================== Query-Expression Form ====================

/// The same formula as a SurrealQL expression over an `item` row.
///
/// `math::round` ties away from zero, matching `MidpointAwayFromZero`
/// above. The `?? 'percentage'` / `?? 0` coalescing covers rows without
/// a discount sub-object.
pub const EFFECTIVE_PRICE_EXPR: &str = "math::max([0, \
     IF (discount.type ?? 'percentage') = 'percentage' \
     THEN math::round((price - price * (discount.amount ?? 0) / 100) * 100) / 100 \
     ELSE math::round((price - (discount.amount ?? 0)) * 100) / 100 \
     END])";

// ==================== Tests ====================
