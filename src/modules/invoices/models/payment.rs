// Payment events recorded against an invoice. The ledger is append-only:
// corrections happen through new events, never by editing history, so the
// paid amount is always the plain sum over the rows.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::money;
use crate::core::{AppError, Result};

/// One recorded payment against an invoice
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoicePayment {
    /// Unique identifier (UUID)
    pub id: String,

    /// Owning invoice
    pub invoice_id: String,

    /// Amount paid, strictly positive
    pub amount: Decimal,

    /// Date the payment was made
    pub payment_date: NaiveDate,

    /// Payment method (bank_transfer, card, cash, ...)
    pub payment_method: Option<String>,

    /// External reference from the payment rail; recorded, not verified
    pub transaction_id: Option<String>,

    /// When the event was recorded
    pub created_at: DateTime<Utc>,
}

impl InvoicePayment {
    /// Create a new payment event with validation
    pub fn new(
        invoice_id: String,
        amount: Decimal,
        payment_date: NaiveDate,
        payment_method: Option<String>,
        transaction_id: Option<String>,
    ) -> Result<Self> {
        money::validate_positive_amount(amount, "Payment amount").map_err(AppError::validation)?;

        if invoice_id.trim().is_empty() {
            return Err(AppError::validation("Invoice ID cannot be empty"));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            invoice_id,
            amount,
            payment_date,
            payment_method,
            transaction_id,
            created_at: Utc::now(),
        })
    }
}

/// Sum of all payment amounts; the invoice's paid_amount is always this value.
pub fn total_paid(payments: &[InvoicePayment]) -> Decimal {
    payments.iter().map(|p| p.amount).sum()
}
