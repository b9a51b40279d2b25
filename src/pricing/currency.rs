use serde::Serialize;

/// Display and wording data for a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    /// Name of the major unit as printed in amounts in words ("Rupees").
    pub major_unit: String,
    pub minor_unit: String,
    pub minor_digits: u32,
    /// Lakh/crore digit grouping (12,34,567.89).
    pub indian_grouping: bool,
}

struct KnownCurrency {
    code: &'static str,
    symbol: &'static str,
    major: &'static str,
    minor: &'static str,
    indian: bool,
}

const KNOWN: &[KnownCurrency] = &[
    KnownCurrency { code: "INR", symbol: "Rs.", major: "Rupees", minor: "Paise", indian: true },
    KnownCurrency { code: "USD", symbol: "$", major: "US Dollars", minor: "Cents", indian: false },
    KnownCurrency { code: "EUR", symbol: "EUR", major: "Euros", minor: "Cents", indian: false },
    KnownCurrency { code: "GBP", symbol: "GBP", major: "Pounds Sterling", minor: "Pence", indian: false },
    KnownCurrency { code: "AED", symbol: "AED", major: "UAE Dirhams", minor: "Fils", indian: false },
    KnownCurrency { code: "SGD", symbol: "S$", major: "Singapore Dollars", minor: "Cents", indian: false },
    KnownCurrency { code: "AUD", symbol: "A$", major: "Australian Dollars", minor: "Cents", indian: false },
    KnownCurrency { code: "CAD", symbol: "C$", major: "Canadian Dollars", minor: "Cents", indian: false },
    KnownCurrency { code: "JPY", symbol: "JPY", major: "Japanese Yen", minor: "Sen", indian: false },
    KnownCurrency { code: "CNY", symbol: "CNY", major: "Yuan Renminbi", minor: "Fen", indian: false },
];

/// Lookup over the currencies the documents know how to print.
pub struct CurrencyCatalogue;

impl CurrencyCatalogue {
    /// Resolves a code. Unknown but well formed codes (three upper case
    /// letters) get generic unit names so documents still render.
    pub fn lookup(code: &str) -> Option<Currency> {
        let code = code.trim().to_ascii_uppercase();
        if let Some(known) = KNOWN.iter().find(|c| c.code == code) {
            return Some(Currency {
                code: known.code.to_string(),
                symbol: known.symbol.to_string(),
                major_unit: known.major.to_string(),
                minor_unit: known.minor.to_string(),
                minor_digits: 2,
                indian_grouping: known.indian,
            });
        }
        if is_iso_like(&code) {
            return Some(Currency {
                symbol: code.clone(),
                major_unit: code.clone(),
                minor_unit: "Cents".to_string(),
                minor_digits: 2,
                indian_grouping: false,
                code,
            });
        }
        None
    }

    pub fn is_valid_code(code: &str) -> bool {
        is_iso_like(code)
    }
}

fn is_iso_like(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// `validator` hook for currency fields.
pub fn validate_currency_code(code: &str) -> Result<(), validator::ValidationError> {
    if is_iso_like(code) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("currency_code"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inr_uses_indian_grouping() {
        let inr = CurrencyCatalogue::lookup("inr").unwrap();
        assert!(inr.indian_grouping);
        assert_eq!(inr.major_unit, "Rupees");
        assert_eq!(inr.minor_unit, "Paise");
    }

    #[test]
    fn unknown_codes_fall_back_to_generic_names() {
        let chf = CurrencyCatalogue::lookup("CHF").unwrap();
        assert_eq!(chf.major_unit, "CHF");
        assert!(!chf.indian_grouping);
        assert!(CurrencyCatalogue::lookup("dollars").is_none());
        assert!(validate_currency_code("usd").is_err());
        assert!(validate_currency_code("USD").is_ok());
    }
}
