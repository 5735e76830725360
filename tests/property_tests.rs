use proptest::prelude::*;
use rust_decimal::Decimal;
use tailorshop_api::{
    entities::order::OrderStatus,
    errors::{AmountField, OrderValidationError},
    services::payments::{check_amounts, parse_amount, remaining_amount, validate_payment, AmountInput},
};

/// Formats whole units with thousands separators, e.g. `1800000` as `1,800,000`.
fn with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn cents(value: u64) -> Decimal {
    Decimal::new(value as i64, 2)
}

proptest! {
    #[test]
    fn grouped_amounts_parse_to_their_value(units in 0u64..99_999_999) {
        let parsed = parse_amount(
            AmountField::TotalAmount,
            &AmountInput::Text(with_commas(units)),
        ).unwrap();
        prop_assert_eq!(parsed, Decimal::from(units));
    }

    #[test]
    fn parsed_amounts_keep_two_decimal_places(raw in 0u64..9_999_999_999) {
        let input = AmountInput::Text(cents(raw).to_string());
        let parsed = parse_amount(AmountField::AdvanceAmount, &input).unwrap();
        prop_assert_eq!(parsed.scale(), 2);
        prop_assert_eq!(parsed, cents(raw));
    }

    #[test]
    fn remaining_is_never_negative(total in 0u64..10_000_000_000, advance in 0u64..10_000_000_000) {
        let remaining = remaining_amount(cents(total), cents(advance));
        prop_assert!(remaining >= Decimal::ZERO);
        prop_assert!(remaining <= cents(total));
    }

    #[test]
    fn accepted_pairs_never_overpay(total in 0u64..10_000_000_000, advance in 0u64..10_000_000_000) {
        let (total, advance) = (cents(total), cents(advance));
        match check_amounts(total, advance) {
            Ok(()) => prop_assert!(advance.is_zero() || advance <= total),
            Err(err) => {
                prop_assert_eq!(err, OrderValidationError::AdvanceExceedsTotal);
                prop_assert!(advance > total);
            }
        }
    }

    #[test]
    fn validated_payment_matches_remaining(total in 1u64..10_000_000, advance in 1u64..10_000_000) {
        prop_assume!(advance <= total);
        let amounts = validate_payment(
            Some(&AmountInput::Text(with_commas(total))),
            Some(&AmountInput::Number(Decimal::from(advance))),
        ).unwrap();
        prop_assert_eq!(
            amounts.remaining_amount(),
            Decimal::from(total) - Decimal::from(advance)
        );
    }

    #[test]
    fn progress_follows_workflow_order(a in 0usize..9, b in 0usize..9) {
        let (first, second) = (OrderStatus::ALL[a], OrderStatus::ALL[b]);
        prop_assert!(first.progress_percentage() <= 100);
        prop_assert!(first.progress_percentage() > 0);
        if a < b {
            prop_assert!(first.progress_percentage() < second.progress_percentage());
        }
    }

    #[test]
    fn status_codes_round_trip(idx in 0usize..9) {
        let status = OrderStatus::ALL[idx];
        prop_assert_eq!(OrderStatus::from_code(status.code()).unwrap(), status);
        prop_assert_eq!(status.index(), idx);
    }
}

#[test]
fn only_the_last_stage_reaches_one_hundred() {
    let full: Vec<_> = OrderStatus::ALL
        .iter()
        .filter(|s| s.progress_percentage() == 100)
        .collect();
    assert_eq!(full, vec![&OrderStatus::TERMINAL]);
}
