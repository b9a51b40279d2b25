use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Thresholds above which a quote needs explicit approval before it can go out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    /// Grand total in base currency.
    pub value_threshold: Decimal,
    /// Highest line discount percent allowed without approval.
    pub discount_threshold: Decimal,
}

impl ApprovalPolicy {
    pub fn new(value_threshold: Decimal, discount_threshold: Decimal) -> Self {
        Self {
            value_threshold,
            discount_threshold,
        }
    }

    pub fn requires_approval(&self, base_value: Decimal, max_discount_percent: Decimal) -> bool {
        base_value > self.value_threshold || max_discount_percent > self.discount_threshold
    }
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            value_threshold: Decimal::new(500_000, 0),
            discount_threshold: Decimal::new(10, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test_case(dec!(499_999.99), dec!(0), false ; "below both")]
    #[test_case(dec!(500_000), dec!(10), false ; "thresholds are inclusive limits")]
    #[test_case(dec!(500_000.01), dec!(0), true ; "value above")]
    #[test_case(dec!(100), dec!(10.5), true ; "discount above")]
    fn default_policy(value: Decimal, discount: Decimal, expected: bool) {
        assert_eq!(
            ApprovalPolicy::default().requires_approval(value, discount),
            expected
        );
    }
}
