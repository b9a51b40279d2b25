use rust_decimal::{Decimal, RoundingStrategy};

use crate::pricing::currency::Currency;

/// Inserts separators into a string of digits: groups of three, or for Indian
/// grouping the last three and then pairs (12,34,567).
fn group_digits(digits: &str, indian: bool) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(len - 3);
    let step = if indian { 2 } else { 3 };

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(step);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

/// Formats `amount` to `digits` decimals with thousands separators.
pub fn format_grouped(amount: Decimal, digits: u32, indian: bool) -> String {
    let rounded = amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.*}", digits as usize, rounded.abs());
    let (whole, fraction) = match plain.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (plain.as_str(), None),
    };

    let mut out = String::with_capacity(plain.len() + plain.len() / 2 + 1);
    if negative {
        out.push('-');
    }
    out.push_str(&group_digits(whole, indian));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Formats an amount the way `currency` groups its digits.
pub fn format_amount(amount: Decimal, currency: &Currency) -> String {
    format_grouped(amount, currency.minor_digits, currency.indian_grouping)
}

/// Amount prefixed with the currency code, e.g. `USD 1,250.00`.
pub fn format_with_code(amount: Decimal, currency: &Currency) -> String {
    format!("{} {}", currency.code, format_amount(amount, currency))
}

/// Exchange rates and percentages print without trailing zeros.
pub fn format_plain(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::currency::CurrencyCatalogue;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test_case(dec!(0), "0.00")]
    #[test_case(dec!(999.5), "999.50")]
    #[test_case(dec!(1234.5), "1,234.50")]
    #[test_case(dec!(123456.789), "1,23,456.79")]
    #[test_case(dec!(1234567.89), "12,34,567.89")]
    #[test_case(dec!(123456789), "12,34,56,789.00")]
    #[test_case(dec!(-1234567.891), "-12,34,567.89")]
    fn indian_grouping(amount: Decimal, expected: &str) {
        assert_eq!(format_grouped(amount, 2, true), expected);
    }

    #[test_case(dec!(1234.5), "1,234.50")]
    #[test_case(dec!(1234567.89), "1,234,567.89")]
    #[test_case(dec!(123456789), "123,456,789.00")]
    #[test_case(dec!(-0.001), "0.00")]
    fn international_grouping(amount: Decimal, expected: &str) {
        assert_eq!(format_grouped(amount, 2, false), expected);
    }

    #[test]
    fn currency_controls_grouping() {
        let inr = CurrencyCatalogue::lookup("INR").unwrap();
        let usd = CurrencyCatalogue::lookup("USD").unwrap();
        assert_eq!(format_amount(dec!(1234567.89), &inr), "12,34,567.89");
        assert_eq!(format_with_code(dec!(1234567.89), &usd), "USD 1,234,567.89");
    }

    #[test]
    fn plain_values_drop_trailing_zeros() {
        assert_eq!(format_plain(dec!(83.250000)), "83.25");
        assert_eq!(format_plain(dec!(5.00)), "5");
    }
}
