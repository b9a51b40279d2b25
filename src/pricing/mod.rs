//! Line and document arithmetic.
//!
//! All amounts are `Decimal` and rounded half away from zero to two places at
//! the line level; document totals are sums of already rounded line amounts so
//! a header always matches what its items add up to.

pub mod currency;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

pub use currency::{Currency, CurrencyCatalogue};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest quantity a single line may carry.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
/// Largest unit price, charge or payment amount accepted from callers.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);
/// Largest exchange rate to the base currency.
pub const MAX_EXCHANGE_RATE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// What a line contributes to the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineInput {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct LineAmounts {
    pub gross_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub amount: Decimal,
}

/// Header level charges added on top of the line totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Charges {
    pub freight: Decimal,
    pub insurance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub tax_total: Decimal,
    pub freight: Decimal,
    pub insurance: Decimal,
    pub grand_total: Decimal,
}

impl DocumentTotals {
    /// Value of goods after discount, before tax and charges.
    pub fn net_goods(&self) -> Decimal {
        self.subtotal - self.discount_total
    }
}

/// Inputs must have passed [`validate_line`]; within those bounds the
/// arithmetic cannot overflow.
pub fn compute_line(input: &LineInput) -> LineAmounts {
    let gross = round_money(input.quantity * input.unit_price);
    let discount = round_money(gross * input.discount_percent / HUNDRED);
    let taxable = gross - discount;
    let tax = round_money(taxable * input.tax_percent / HUNDRED);
    LineAmounts {
        gross_amount: gross,
        discount_amount: discount,
        tax_amount: tax,
        amount: taxable + tax,
    }
}

pub fn compute_totals<'a, I>(lines: I, charges: Charges) -> DocumentTotals
where
    I: IntoIterator<Item = &'a LineAmounts>,
{
    let mut totals = DocumentTotals {
        freight: round_money(charges.freight),
        insurance: round_money(charges.insurance),
        ..Default::default()
    };
    for line in lines {
        totals.subtotal += line.gross_amount;
        totals.discount_total += line.discount_amount;
        totals.tax_total += line.tax_amount;
    }
    totals.grand_total = totals.subtotal - totals.discount_total
        + totals.tax_total
        + totals.freight
        + totals.insurance;
    totals
}

/// Converts a document currency amount into the base currency.
pub fn to_base(amount: Decimal, exchange_rate: Decimal) -> Result<Decimal, ServiceError> {
    validate_exchange_rate(exchange_rate)?;
    amount
        .checked_mul(exchange_rate)
        .map(round_money)
        .ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "{} at a rate of {} is too large to convert",
                amount, exchange_rate
            ))
        })
}

/// Converts a base currency amount back into the document currency.
pub fn from_base(amount: Decimal, exchange_rate: Decimal) -> Result<Decimal, ServiceError> {
    validate_exchange_rate(exchange_rate)?;
    Ok(round_money(amount / exchange_rate))
}

pub fn validate_exchange_rate(exchange_rate: Decimal) -> Result<(), ServiceError> {
    if exchange_rate <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "exchange rate must be greater than zero, got {}",
            exchange_rate
        )));
    }
    if exchange_rate > MAX_EXCHANGE_RATE {
        return Err(ServiceError::ValidationError(format!(
            "exchange rate cannot exceed {}, got {}",
            MAX_EXCHANGE_RATE, exchange_rate
        )));
    }
    Ok(())
}

/// Rejects amounts outside `0..=MAX_AMOUNT`.
pub fn validate_amount(value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO {
        return Err("amount cannot be negative".into());
    }
    if value > MAX_AMOUNT {
        return Err(format!("amount cannot exceed {}", MAX_AMOUNT));
    }
    Ok(())
}

/// Checks the numeric bounds every line must satisfy.
pub fn validate_line(input: &LineInput) -> Result<(), String> {
    if input.quantity <= Decimal::ZERO {
        return Err("quantity must be greater than zero".into());
    }
    if input.quantity > MAX_QUANTITY {
        return Err(format!("quantity cannot exceed {}", MAX_QUANTITY));
    }
    if input.unit_price < Decimal::ZERO {
        return Err("unit price cannot be negative".into());
    }
    if input.unit_price > MAX_AMOUNT {
        return Err(format!("unit price cannot exceed {}", MAX_AMOUNT));
    }
    if input.discount_percent < Decimal::ZERO || input.discount_percent > HUNDRED {
        return Err("discount percent must be between 0 and 100".into());
    }
    if input.tax_percent < Decimal::ZERO || input.tax_percent > HUNDRED {
        return Err("tax percent must be between 0 and 100".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(qty: Decimal, price: Decimal, disc: Decimal, tax: Decimal) -> LineInput {
        LineInput {
            quantity: qty,
            unit_price: price,
            discount_percent: disc,
            tax_percent: tax,
        }
    }

    #[test]
    fn line_applies_discount_before_tax() {
        let amounts = compute_line(&line(dec!(10), dec!(12.50), dec!(10), dec!(18)));
        assert_eq!(amounts.gross_amount, dec!(125.00));
        assert_eq!(amounts.discount_amount, dec!(12.50));
        assert_eq!(amounts.tax_amount, dec!(20.25));
        assert_eq!(amounts.amount, dec!(132.75));
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_money(dec!(0.125)), dec!(0.13));
        assert_eq!(round_money(dec!(-0.125)), dec!(-0.13));
        assert_eq!(round_money(dec!(2.345)), dec!(2.35));

        let amounts = compute_line(&line(dec!(3), dec!(0.335), dec!(0), dec!(0)));
        assert_eq!(amounts.gross_amount, dec!(1.01));
    }

    #[test]
    fn totals_add_charges() {
        let a = compute_line(&line(dec!(2), dec!(100), dec!(5), dec!(0)));
        let b = compute_line(&line(dec!(1), dec!(50), dec!(0), dec!(10)));
        let totals = compute_totals(
            [&a, &b],
            Charges {
                freight: dec!(25),
                insurance: dec!(4.5),
            },
        );
        assert_eq!(totals.subtotal, dec!(250));
        assert_eq!(totals.discount_total, dec!(10));
        assert_eq!(totals.tax_total, dec!(5));
        assert_eq!(totals.grand_total, dec!(274.5));
        assert_eq!(totals.net_goods(), dec!(240));
    }

    #[test]
    fn empty_document_totals_are_charges_only() {
        let totals = compute_totals(
            std::iter::empty(),
            Charges {
                freight: dec!(10),
                insurance: Decimal::ZERO,
            },
        );
        assert_eq!(totals.grand_total, dec!(10));
    }

    #[test]
    fn base_conversion_rejects_non_positive_rates() {
        assert_eq!(to_base(dec!(100), dec!(83.125)).unwrap(), dec!(8312.50));
        assert!(to_base(dec!(100), Decimal::ZERO).is_err());
        assert!(from_base(dec!(100), dec!(-1)).is_err());
        assert_eq!(from_base(dec!(8312.50), dec!(83.125)).unwrap(), dec!(100));
    }

    #[test]
    fn line_bounds() {
        assert!(validate_line(&line(dec!(0), dec!(1), dec!(0), dec!(0))).is_err());
        assert!(validate_line(&line(dec!(1), dec!(-1), dec!(0), dec!(0))).is_err());
        assert!(validate_line(&line(dec!(1), dec!(1), dec!(100.01), dec!(0))).is_err());
        assert!(validate_line(&line(dec!(1), dec!(1), dec!(0), dec!(101))).is_err());
        assert!(validate_line(&line(dec!(1), dec!(0), dec!(100), dec!(28))).is_ok());
        assert!(validate_line(&line(MAX_QUANTITY, MAX_AMOUNT, dec!(0), dec!(100))).is_ok());
        assert!(validate_line(&line(MAX_QUANTITY + dec!(1), dec!(1), dec!(0), dec!(0))).is_err());
        assert!(validate_line(&line(dec!(1), MAX_AMOUNT + dec!(0.01), dec!(0), dec!(0))).is_err());
    }

    #[test]
    fn largest_accepted_line_still_converts() {
        let amounts = compute_line(&line(MAX_QUANTITY, MAX_AMOUNT, dec!(0), dec!(100)));
        assert_eq!(amounts.amount, MAX_QUANTITY * MAX_AMOUNT * dec!(2));
        assert!(to_base(amounts.amount, MAX_EXCHANGE_RATE).is_ok());
    }

    #[test]
    fn oversized_conversions_are_errors_not_panics() {
        assert!(matches!(
            to_base(Decimal::MAX, dec!(2)),
            Err(ServiceError::ValidationError(_))
        ));
        assert!(validate_exchange_rate(MAX_EXCHANGE_RATE + dec!(1)).is_err());
        assert!(validate_amount(MAX_AMOUNT).is_ok());
        assert!(validate_amount(MAX_AMOUNT + dec!(1)).is_err());
        assert!(validate_amount(dec!(-0.01)).is_err());
    }
}
