//! Amounts in words, as printed under the totals of a commercial document.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::ServiceError;
use crate::pricing::currency::Currency;

const ONES: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const INDIAN_SCALES: [(u128, &str); 3] = [
    (10_000_000, "Crore"),
    (100_000, "Lakh"),
    (1_000, "Thousand"),
];

const INTERNATIONAL_SCALES: [(u128, &str); 4] = [
    (1_000_000_000_000, "Trillion"),
    (1_000_000_000, "Billion"),
    (1_000_000, "Million"),
    (1_000, "Thousand"),
];

fn below_thousand(n: u128, out: &mut Vec<String>) {
    let hundreds = n / 100;
    let rest = n % 100;
    if hundreds > 0 {
        out.push(ONES[hundreds as usize].to_string());
        out.push("Hundred".to_string());
    }
    if rest >= 20 {
        out.push(TENS[(rest / 10) as usize].to_string());
        if rest % 10 > 0 {
            out.push(ONES[(rest % 10) as usize].to_string());
        }
    } else if rest > 0 {
        out.push(ONES[rest as usize].to_string());
    }
}

/// The largest scale recurses, so a crore of crores reads "One Crore Crore"
/// and a thousand trillion reads "One Thousand Trillion".
fn spell(n: u128, scales: &[(u128, &str)], out: &mut Vec<String>) {
    let mut rest = n;
    for (index, (size, name)) in scales.iter().enumerate() {
        if rest >= *size {
            let count = rest / size;
            if index == 0 {
                spell(count, scales, out);
            } else {
                below_thousand(count, out);
            }
            out.push(name.to_string());
            rest %= size;
        }
    }
    below_thousand(rest, out);
}

/// Spells a whole number with lakh/crore or thousand/million grouping.
pub fn number_in_words(n: u128, indian: bool) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }
    let mut words = Vec::new();
    let scales: &[(u128, &str)] = if indian {
        &INDIAN_SCALES
    } else {
        &INTERNATIONAL_SCALES
    };
    spell(n, scales, &mut words);
    words.join(" ")
}

/// Spells `amount` in `currency`.
///
/// Indian style currencies read `Rupees <major> and <minor> Paise Only`,
/// everything else `US Dollars <major> and Cents <minor> Only`. The minor part
/// is omitted when it rounds to zero.
pub fn amount_in_words(amount: Decimal, currency: &Currency) -> Result<String, ServiceError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ServiceError::InvalidInput(format!(
            "cannot spell a negative amount ({})",
            amount
        )));
    }
    let rounded =
        amount.round_dp_with_strategy(currency.minor_digits, RoundingStrategy::MidpointAwayFromZero);
    let major = rounded.trunc();
    let minor = ((rounded - major) * Decimal::from(10u64.pow(currency.minor_digits))).trunc();

    let too_large = || ServiceError::InvalidInput(format!("amount {} is too large to spell", amount));
    let major = major.to_u128().ok_or_else(too_large)?;
    let minor = minor.to_u128().ok_or_else(too_large)?;

    let indian = currency.indian_grouping;
    let mut text = format!("{} {}", currency.major_unit, number_in_words(major, indian));
    if minor > 0 {
        let minor_words = number_in_words(minor, indian);
        if indian {
            text.push_str(&format!(" and {} {}", minor_words, currency.minor_unit));
        } else {
            text.push_str(&format!(" and {} {}", currency.minor_unit, minor_words));
        }
    }
    text.push_str(" Only");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::currency::CurrencyCatalogue;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn currency(code: &str) -> Currency {
        CurrencyCatalogue::lookup(code).unwrap()
    }

    #[test_case(0, "Zero")]
    #[test_case(7, "Seven")]
    #[test_case(15, "Fifteen")]
    #[test_case(40, "Forty")]
    #[test_case(99, "Ninety Nine")]
    #[test_case(105, "One Hundred Five")]
    #[test_case(1_234, "One Thousand Two Hundred Thirty Four")]
    #[test_case(100_000, "One Lakh")]
    #[test_case(1_234_567, "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven")]
    #[test_case(10_000_000, "One Crore")]
    #[test_case(1_000_000_000, "One Hundred Crore")]
    #[test_case(100_000_000_000_000, "One Crore Crore")]
    fn indian_grouping(n: u128, expected: &str) {
        assert_eq!(number_in_words(n, true), expected);
    }

    #[test_case(1_000_000, "One Million")]
    #[test_case(1_234_567, "One Million Two Hundred Thirty Four Thousand Five Hundred Sixty Seven")]
    #[test_case(2_000_000_001, "Two Billion One")]
    #[test_case(5_000_000_000_000, "Five Trillion")]
    #[test_case(1_000_000_000_000_000, "One Thousand Trillion")]
    fn international_grouping(n: u128, expected: &str) {
        assert_eq!(number_in_words(n, false), expected);
    }

    #[test]
    fn rupees_and_paise() {
        let words = amount_in_words(dec!(123456.50), &currency("INR")).unwrap();
        assert_eq!(
            words,
            "Rupees One Lakh Twenty Three Thousand Four Hundred Fifty Six and Fifty Paise Only"
        );
    }

    #[test]
    fn dollars_and_cents() {
        let words = amount_in_words(dec!(1250.05), &currency("USD")).unwrap();
        assert_eq!(
            words,
            "US Dollars One Thousand Two Hundred Fifty and Cents Five Only"
        );
    }

    #[test]
    fn whole_amounts_and_zero() {
        assert_eq!(
            amount_in_words(dec!(0), &currency("INR")).unwrap(),
            "Rupees Zero Only"
        );
        assert_eq!(
            amount_in_words(dec!(3000.00), &currency("USD")).unwrap(),
            "US Dollars Three Thousand Only"
        );
    }

    #[test]
    fn minor_units_round_half_up() {
        assert_eq!(
            amount_in_words(dec!(9.995), &currency("USD")).unwrap(),
            "US Dollars Ten Only"
        );
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert_matches!(
            amount_in_words(dec!(-1), &currency("INR")),
            Err(ServiceError::InvalidInput(_))
        );
    }
}
