use rust_decimal::Decimal;

use crate::core::money;
use crate::modules::invoices::models::InvoiceItem;

/// The three derived monetary fields, always produced together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

/// TotalsCalculator derives an invoice's monetary fields from its line
/// items, discount, and tax rate.
///
/// Pure: same inputs, same outputs, no side effects. Callers validate the
/// inputs (item shape, tax rate range, discount sign) at the boundary.
pub struct TotalsCalculator;

impl TotalsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Sum of extended prices across all line items
    ///
    /// Each item's total_price is already rounded, so the subtotal is
    /// independent of item ordering.
    pub fn aggregate_subtotal(&self, items: &[InvoiceItem]) -> Decimal {
        items.iter().map(|item| item.total_price).sum()
    }

    /// Tax on the discounted base
    ///
    /// The taxable base clamps at zero when the discount exceeds the
    /// subtotal; tax is never computed on a negative base.
    pub fn tax_on(&self, subtotal: Decimal, discount_amount: Decimal, tax_rate: Decimal) -> Decimal {
        let taxable_base = (subtotal - discount_amount).max(Decimal::ZERO);
        money::round_money(taxable_base * tax_rate / Decimal::ONE_HUNDRED)
    }

    /// Derive all monetary fields from the line items in one pass
    ///
    /// total_amount = max(subtotal - discount, 0) + tax_amount, so the grand
    /// total floors at zero alongside the taxable base.
    pub fn compute(
        &self,
        items: &[InvoiceItem],
        discount_amount: Decimal,
        tax_rate: Decimal,
    ) -> InvoiceTotals {
        let subtotal = self.aggregate_subtotal(items);
        let taxable_base = (subtotal - discount_amount).max(Decimal::ZERO);
        let tax_amount = money::round_money(taxable_base * tax_rate / Decimal::ONE_HUNDRED);

        InvoiceTotals {
            subtotal,
            tax_amount,
            total_amount: taxable_base + tax_amount,
        }
    }
}

impl Default for TotalsCalculator {
    fn default() -> Self {
        Self::new()
    }
}
