//! Property-based tests for the money arithmetic, the document number format
//! and the workflow table.

use proptest::prelude::*;
use rust_decimal::Decimal;

use tradedocs_api::{
    pdf::{money::format_grouped, words::amount_in_words},
    pricing::{compute_line, compute_totals, Charges, CurrencyCatalogue, LineInput},
    services::numbering::format_number,
    workflow::{self, DocumentKind, DocumentStatus, PlanContext, WorkflowAction},
};

fn money_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|milli| Decimal::new(milli, 3))
}

fn percent_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|basis| Decimal::new(basis, 2))
}

fn line_strategy() -> impl Strategy<Value = LineInput> {
    (
        quantity_strategy(),
        money_strategy(),
        percent_strategy(),
        percent_strategy(),
    )
        .prop_map(|(quantity, unit_price, discount_percent, tax_percent)| LineInput {
            quantity,
            unit_price,
            discount_percent,
            tax_percent,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn line_amount_is_gross_less_discount_plus_tax(line in line_strategy()) {
        let amounts = compute_line(&line);
        prop_assert!(amounts.discount_amount <= amounts.gross_amount);
        prop_assert!(amounts.tax_amount >= Decimal::ZERO);
        prop_assert_eq!(
            amounts.amount,
            amounts.gross_amount - amounts.discount_amount + amounts.tax_amount
        );
        prop_assert!(amounts.amount.scale() <= 2);
    }

    #[test]
    fn grand_total_adds_up(
        lines in prop::collection::vec(line_strategy(), 0..12),
        freight in money_strategy(),
        insurance in money_strategy(),
    ) {
        let amounts: Vec<_> = lines.iter().map(compute_line).collect();
        let totals = compute_totals(&amounts, Charges { freight, insurance });
        let line_sum: Decimal = amounts.iter().map(|a| a.amount).sum();
        prop_assert_eq!(totals.grand_total, line_sum + freight + insurance);
        prop_assert_eq!(totals.net_goods() + totals.tax_total, line_sum);
    }

    #[test]
    fn grouping_only_inserts_separators(amount in money_strategy(), indian in any::<bool>()) {
        let grouped = format_grouped(amount, 2, indian);
        prop_assert_eq!(grouped.replace(',', ""), format!("{:.2}", amount));
    }

    #[test]
    fn amounts_in_words_are_always_spelt(amount in money_strategy()) {
        for code in ["INR", "USD"] {
            let currency = CurrencyCatalogue::lookup(code).expect("known currency");
            let words = amount_in_words(amount, &currency).expect("spelt");
            prop_assert!(words.starts_with(&currency.major_unit.to_string()));
            prop_assert!(words.ends_with(" Only"));
        }
    }

    #[test]
    fn document_numbers_sort_within_a_year(a in 1i64..9999, b in 1i64..9999) {
        let first = format_number(DocumentKind::ProformaInvoice, 2026, a.min(b));
        let second = format_number(DocumentKind::ProformaInvoice, 2026, a.max(b));
        prop_assert!(first.starts_with("PI-2026-"));
        prop_assert!(first <= second);
    }
}

#[test]
fn planning_agrees_with_the_allowed_actions() {
    use sea_orm::Iterable;
    use strum::IntoEnumIterator;

    for kind in DocumentKind::iter() {
        for status in DocumentStatus::iter() {
            let allowed = workflow::allowed_actions(kind, status);
            for action in WorkflowAction::iter() {
                let planned = workflow::plan(kind, status, action, PlanContext::default());
                assert_eq!(
                    planned.is_ok(),
                    allowed.contains(&action),
                    "{} {} {}",
                    kind,
                    status,
                    action
                );
                if let Ok(transition) = planned {
                    assert_eq!(transition.bumps_version, action == WorkflowAction::Revise);
                }
            }
            if status.is_terminal() {
                assert!(allowed.is_empty(), "{} {} should be final", kind, status);
            }
        }
    }
}
