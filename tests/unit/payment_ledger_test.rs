// Payment ledger arithmetic: paid amount is the plain sum over the
// append-only event list, balances derive from totals, and the sum is
// insensitive to recording order.

use chrono::NaiveDate;
use faktura::invoices::models::payment::total_paid;
use faktura::invoices::InvoicePayment;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn payment(amount: Decimal) -> InvoicePayment {
    InvoicePayment::new(
        "inv-1".to_string(),
        amount,
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        None,
        None,
    )
    .unwrap()
}

#[test]
fn test_partial_payments_sum() {
    // total 200, payments [80, 70] -> paid 150, balance 50
    let payments = vec![payment(dec!(80)), payment(dec!(70))];

    let paid = total_paid(&payments);
    assert_eq!(paid, dec!(150));
    assert_eq!(dec!(200) - paid, dec!(50));
}

#[test]
fn test_single_full_payment() {
    // total 200, payments [200] -> paid 200, balance 0
    let payments = vec![payment(dec!(200))];

    let paid = total_paid(&payments);
    assert_eq!(paid, dec!(200));
    assert_eq!(dec!(200) - paid, dec!(0));
}

#[test]
fn test_overpayment_reports_negative_balance() {
    let payments = vec![payment(dec!(150)), payment(dec!(100))];

    let paid = total_paid(&payments);
    assert_eq!(paid, dec!(250));
    assert_eq!(dec!(200) - paid, dec!(-50));
}

#[test]
fn test_sum_is_order_insensitive() {
    // [5, 10] then [20] equals [20, 5, 10] in any order
    let a = vec![payment(dec!(5)), payment(dec!(10)), payment(dec!(20))];
    let b = vec![payment(dec!(20)), payment(dec!(5)), payment(dec!(10))];

    assert_eq!(total_paid(&a), dec!(35));
    assert_eq!(total_paid(&a), total_paid(&b));
}

#[test]
fn test_rejects_non_positive_amounts() {
    let zero = InvoicePayment::new(
        "inv-1".to_string(),
        dec!(0),
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        None,
        None,
    );
    assert!(zero.is_err());

    let negative = InvoicePayment::new(
        "inv-1".to_string(),
        dec!(-25),
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        None,
        None,
    );
    assert!(negative.is_err());
}

proptest! {
    #[test]
    fn prop_total_paid_is_permutation_invariant(
        amounts in proptest::collection::vec(1u64..1_000_000u64, 1..8),
    ) {
        let forward: Vec<_> = amounts
            .iter()
            .map(|cents| payment(Decimal::new(*cents as i64, 2)))
            .collect();
        let mut shuffled = forward.clone();
        shuffled.reverse();
        let mid = shuffled.len() / 2;
        shuffled.rotate_left(mid);

        prop_assert_eq!(total_paid(&forward), total_paid(&shuffled));
    }

    #[test]
    fn prop_total_paid_is_strictly_monotonic(
        amounts in proptest::collection::vec(1u64..1_000_000u64, 1..8),
    ) {
        let mut ledger: Vec<InvoicePayment> = Vec::new();
        let mut previous = Decimal::ZERO;

        for cents in amounts {
            ledger.push(payment(Decimal::new(cents as i64, 2)));
            let current = total_paid(&ledger);
            prop_assert!(current > previous);
            previous = current;
        }
    }
}
