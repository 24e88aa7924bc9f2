// Invoice totals: line item aggregation plus tax and discount.
//
// Covers the canonical computation scenarios and the algebraic properties
// the calculator must hold: order independence, base clamping, and the
// subtotal/tax/total relationship.

use faktura::invoices::services::totals::TotalsCalculator;
use faktura::invoices::InvoiceItem;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn item(quantity: Decimal, unit_price: Decimal, sort_order: i32) -> InvoiceItem {
    InvoiceItem::new(
        "inv-1".to_string(),
        "Work".to_string(),
        quantity,
        unit_price,
        sort_order,
    )
    .unwrap()
}

#[test]
fn test_scenario_two_items_with_tax() {
    // items [{qty 2, price 50}, {qty 1, price 25}], discount 0, tax 10%
    // -> subtotal 125, tax 12.50, total 137.50
    let items = vec![item(dec!(2), dec!(50), 0), item(dec!(1), dec!(25), 1)];

    let totals = TotalsCalculator::new().compute(&items, dec!(0), dec!(10));

    assert_eq!(totals.subtotal, dec!(125));
    assert_eq!(totals.tax_amount, dec!(12.50));
    assert_eq!(totals.total_amount, dec!(137.50));
}

#[test]
fn test_scenario_discount_exceeds_subtotal() {
    // subtotal 100, discount 150, tax 20% -> base clamps to 0, tax 0, total 0
    let items = vec![item(dec!(1), dec!(100), 0)];

    let totals = TotalsCalculator::new().compute(&items, dec!(150), dec!(20));

    assert_eq!(totals.subtotal, dec!(100));
    assert_eq!(totals.tax_amount, dec!(0));
    assert_eq!(totals.total_amount, dec!(0));
}

#[test]
fn test_discount_reduces_taxable_base() {
    // subtotal 200, discount 50, tax 10% -> tax 15.00, total 165.00
    let items = vec![item(dec!(2), dec!(100), 0)];

    let totals = TotalsCalculator::new().compute(&items, dec!(50), dec!(10));

    assert_eq!(totals.tax_amount, dec!(15.00));
    assert_eq!(totals.total_amount, dec!(165.00));
}

#[test]
fn test_zero_items_zero_everything() {
    let totals = TotalsCalculator::new().compute(&[], dec!(0), dec!(25));

    assert_eq!(totals.subtotal, dec!(0));
    assert_eq!(totals.tax_amount, dec!(0));
    assert_eq!(totals.total_amount, dec!(0));
}

#[test]
fn test_subtotal_is_order_independent() {
    let forward = vec![
        item(dec!(3), dec!(19.99), 0),
        item(dec!(1.5), dec!(33.33), 1),
        item(dec!(7), dec!(0.07), 2),
    ];
    let reversed: Vec<_> = forward.iter().rev().cloned().collect();

    let calc = TotalsCalculator::new();
    assert_eq!(
        calc.aggregate_subtotal(&forward),
        calc.aggregate_subtotal(&reversed)
    );
}

#[test]
fn test_tax_rounding_half_up() {
    // base 10.25 at 5% = 0.5125 -> 0.51; base 10.30 at 5% = 0.515 -> 0.52
    let calc = TotalsCalculator::new();
    assert_eq!(calc.tax_on(dec!(10.25), dec!(0), dec!(5)), dec!(0.51));
    assert_eq!(calc.tax_on(dec!(10.30), dec!(0), dec!(5)), dec!(0.52));
}

proptest! {
    #[test]
    fn prop_total_equals_clamped_base_plus_tax(
        subtotal_cents in 0u64..1_000_000_00u64,
        discount_cents in 0u64..1_000_000_00u64,
        tax_rate_percent in 0u8..=100u8,
    ) {
        let subtotal = Decimal::new(subtotal_cents as i64, 2);
        let discount = Decimal::new(discount_cents as i64, 2);
        let tax_rate = Decimal::from(tax_rate_percent);

        let items = vec![item(dec!(1), subtotal, 0)];
        let totals = TotalsCalculator::new().compute(&items, discount, tax_rate);

        let base = (subtotal - discount).max(Decimal::ZERO);
        prop_assert_eq!(totals.total_amount, base + totals.tax_amount);
        prop_assert!(totals.tax_amount >= Decimal::ZERO);
        prop_assert!(totals.total_amount >= Decimal::ZERO);
    }

    #[test]
    fn prop_tax_never_exceeds_base(
        subtotal_cents in 0u64..1_000_000_00u64,
        tax_rate_percent in 0u8..=100u8,
    ) {
        let subtotal = Decimal::new(subtotal_cents as i64, 2);
        let tax_rate = Decimal::from(tax_rate_percent);

        let tax = TotalsCalculator::new().tax_on(subtotal, Decimal::ZERO, tax_rate);

        // At 100% the rounded tax can match the base but not exceed it,
        // because bases carry at most 2 decimal places already
        prop_assert!(tax <= subtotal);
    }

    #[test]
    fn prop_zero_rate_means_zero_tax(
        subtotal_cents in 0u64..1_000_000_00u64,
        discount_cents in 0u64..1_000_000_00u64,
    ) {
        let subtotal = Decimal::new(subtotal_cents as i64, 2);
        let discount = Decimal::new(discount_cents as i64, 2);

        let tax = TotalsCalculator::new().tax_on(subtotal, discount, Decimal::ZERO);

        prop_assert_eq!(tax, Decimal::ZERO);
    }
}
