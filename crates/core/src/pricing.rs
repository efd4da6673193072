//! Price relationship checks and derived pricing figures.
//!
//! Profit, margin, and discount are computed on read and never persisted.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::validation::{FieldErrorCode, ValidationErrors};

/// Message attached to `compare_at_price` when it does not exceed the regular price.
pub const COMPARE_AT_ORDER_MESSAGE: &str = "Compare at price must be greater than regular price";

/// Reject a compare-at price that is present and not strictly greater than
/// the regular price. The failure is recorded on `compare_at_price`.
pub fn check_price_order(
    errors: &mut ValidationErrors,
    regular_price: Decimal,
    compare_at_price: Option<Decimal>,
) {
    if let Some(compare_at) = compare_at_price {
        if compare_at <= regular_price {
            errors.add(
                "compare_at_price",
                FieldErrorCode::Ordering,
                COMPARE_AT_ORDER_MESSAGE,
            );
        }
    }
}

/// Display-ready figures derived from a product's stored prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSummary {
    /// `regular_price - cost_per_item`, when a cost is recorded.
    pub profit: Option<Decimal>,
    /// Profit as a percentage of the regular price.
    pub margin_percent: Option<Decimal>,
    /// Savings against the compare-at price, as a percentage of it.
    pub discount_percent: Option<Decimal>,
}

impl PriceSummary {
    pub fn compute(
        regular_price: Decimal,
        compare_at_price: Option<Decimal>,
        cost_per_item: Option<Decimal>,
    ) -> Self {
        let profit = profit(regular_price, cost_per_item);
        Self {
            profit,
            margin_percent: margin_percent(regular_price, cost_per_item),
            discount_percent: discount_percent(regular_price, compare_at_price),
        }
    }
}

pub fn profit(regular_price: Decimal, cost_per_item: Option<Decimal>) -> Option<Decimal> {
    cost_per_item.map(|cost| regular_price - cost)
}

/// `None` when no cost is recorded or the regular price is zero.
pub fn margin_percent(regular_price: Decimal, cost_per_item: Option<Decimal>) -> Option<Decimal> {
    if regular_price.is_zero() {
        return None;
    }
    let profit = profit(regular_price, cost_per_item)?;
    Some((profit / regular_price * Decimal::ONE_HUNDRED).round_dp(2))
}

/// Only defined when the compare-at price exceeds the regular price.
pub fn discount_percent(
    regular_price: Decimal,
    compare_at_price: Option<Decimal>,
) -> Option<Decimal> {
    let compare_at = compare_at_price.filter(|c| *c > regular_price)?;
    Some(((compare_at - regular_price) / compare_at * Decimal::ONE_HUNDRED).round_dp(2))
}
