//! Common types and money helpers used across the platform

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places kept on every currency amount (paise)
pub const CURRENCY_DP: u32 = 2;

/// Round a currency amount half-to-even at two decimal places
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointNearestEven)
}

/// `amount × rate_percent / 100`, unrounded
pub fn percent_of(amount: Decimal, rate_percent: Decimal) -> Decimal {
    amount * rate_percent / Decimal::ONE_HUNDRED
}

/// Lower/upper bound parsed from a catalog price range such as "₹350 - ₹420"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceRange {
    pub lower: Decimal,
    pub upper: Decimal,
}

impl PriceRange {
    /// Parse a string-encoded range. A single figure ("₹0") yields a range
    /// whose bounds are equal.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut bounds = raw
            .split(['-', '–'])
            .map(|part| {
                let digits: String = part
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                digits.parse::<Decimal>().ok()
            });

        let lower = bounds.next()??;
        let upper = match bounds.next() {
            Some(upper) => upper?,
            None => lower,
        };
        if bounds.next().is_some() || upper < lower {
            return None;
        }
        Some(Self { lower, upper })
    }
}
