use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Fixed,
    Percent,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Fixed => "FIXED",
            DiscountType::Percent => "PERCENT",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIXED" => Ok(DiscountType::Fixed),
            "PERCENT" => Ok(DiscountType::Percent),
            other => Err(format!("Unknown discount type '{other}'")),
        }
    }
}

/// Compute the discount a coupon grants against a cart subtotal.
///
/// FIXED grants the configured value; PERCENT grants `subtotal * value / 100`
/// capped by `max_discount` when one is set. The result is clamped into
/// `0 ..= subtotal` in all cases.
pub fn compute_discount(
    discount_type: DiscountType,
    value: &BigDecimal,
    max_discount: Option<&BigDecimal>,
    subtotal: &BigDecimal,
) -> BigDecimal {
    let mut discount = match discount_type {
        DiscountType::Fixed => value.clone(),
        DiscountType::Percent => {
            let pct = (subtotal * value) / BigDecimal::from(100);
            match max_discount {
                Some(cap) if &pct > cap => cap.clone(),
                _ => pct,
            }
        }
    };
    if &discount > subtotal {
        discount = subtotal.clone();
    }
    if discount < BigDecimal::zero() {
        discount = BigDecimal::zero();
    }
    discount
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        s.parse().expect("valid decimal")
    }

    #[test]
    fn fixed_discount_applies_in_full() {
        let discount = compute_discount(DiscountType::Fixed, &dec("50"), None, &dec("300"));
        assert_eq!(discount, dec("50"));
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() {
        let discount = compute_discount(DiscountType::Fixed, &dec("50"), None, &dec("30"));
        assert_eq!(discount, dec("30"));
    }

    #[test]
    fn percent_discount_is_capped_by_max_discount() {
        let discount =
            compute_discount(DiscountType::Percent, &dec("10"), Some(&dec("20")), &dec("1000"));
        assert_eq!(discount, dec("20"));
    }

    #[test]
    fn percent_discount_without_cap() {
        let discount = compute_discount(DiscountType::Percent, &dec("10"), None, &dec("250"));
        assert_eq!(discount, dec("25"));
    }

    #[test]
    fn percent_discount_never_exceeds_subtotal() {
        let discount = compute_discount(DiscountType::Percent, &dec("150"), None, &dec("80"));
        assert_eq!(discount, dec("80"));
    }

    #[test]
    fn negative_configured_value_clamps_to_zero() {
        let discount = compute_discount(DiscountType::Fixed, &dec("-5"), None, &dec("100"));
        assert_eq!(discount, BigDecimal::zero());
    }

    #[test]
    fn zero_subtotal_yields_zero_discount() {
        let discount = compute_discount(DiscountType::Fixed, &dec("50"), None, &BigDecimal::zero());
        assert_eq!(discount, BigDecimal::zero());
    }
}
