// Invoice model: monetary fields derived from line items, an append-only
// payment ledger, and a status lifecycle driven by an explicit transition
// table. Computation flows one way (items -> subtotal -> tax/discount ->
// total) and payments flow one way (events -> paid_amount -> balance ->
// status); apply_event is the only place status changes.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::invoice_item::InvoiceItem;
use super::payment::InvoicePayment;
use crate::core::money;
use crate::core::{AppError, Result};
use crate::modules::invoices::services::totals::TotalsCalculator;

/// Invoice status lifecycle
///
/// draft -> sent -> viewed -> {partial, paid} -> overdue; cancelled is
/// reachable from any non-terminal state; paid and cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Created, still editable, not yet issued to the client
    Draft,

    /// Issued to the client
    Sent,

    /// Opened by the recipient
    Viewed,

    /// Paid in part, balance outstanding
    Partial,

    /// Fully paid (terminal)
    Paid,

    /// Past due date without full payment
    Overdue,

    /// Cancelled by the owner (terminal)
    Cancelled,
}

impl InvoiceStatus {
    /// Terminal statuses admit no further lifecycle events
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Viewed => write!(f, "viewed"),
            InvoiceStatus::Partial => write!(f, "partial"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
            InvoiceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "viewed" => Ok(InvoiceStatus::Viewed),
            "partial" => Ok(InvoiceStatus::Partial),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

/// Lifecycle events accepted by the status machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Owner issues the invoice to the client
    Send,

    /// Recipient opens the invoice
    MarkViewed,

    /// A payment was appended to the ledger; status is re-derived from
    /// paid_amount vs. total_amount
    PaymentRecorded,

    /// Owner cancels the invoice
    Cancel,
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleEvent::Send => write!(f, "send"),
            LifecycleEvent::MarkViewed => write!(f, "mark_viewed"),
            LifecycleEvent::PaymentRecorded => write!(f, "payment_recorded"),
            LifecycleEvent::Cancel => write!(f, "cancel"),
        }
    }
}

/// A billing document
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    /// Unique invoice ID (UUID), immutable
    pub id: String,

    /// Owning user account
    pub user_id: String,

    /// Optional client association, informational only
    pub client_id: Option<String>,

    /// Optional project association, informational only
    pub project_id: Option<String>,

    /// Unique per user, sequential, immutable once assigned
    pub invoice_number: String,

    /// Sum of line item extended prices
    pub subtotal: Decimal,

    /// Tax rate in percent, 0-100
    pub tax_rate: Decimal,

    /// Tax on the discounted base, recomputed together with total_amount
    pub tax_amount: Decimal,

    /// Flat discount applied before tax
    pub discount_amount: Decimal,

    /// Grand total: max(subtotal - discount, 0) + tax_amount
    pub total_amount: Decimal,

    /// Sum of all recorded payments
    pub paid_amount: Decimal,

    /// Current lifecycle status
    pub status: InvoiceStatus,

    /// Date the invoice is issued
    pub issue_date: NaiveDate,

    /// issue_date + payment terms, immutable after creation
    pub due_date: NaiveDate,

    /// Set exactly once, the first time the invoice is sent
    pub sent_at: Option<DateTime<Utc>>,

    /// Set exactly once, the first time the recipient opens it
    pub viewed_at: Option<DateTime<Utc>>,

    /// Set exactly once, when the invoice first becomes fully paid
    pub paid_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Create a new invoice in draft with zero items
    ///
    /// The invoice number must already be allocated; due date is derived from
    /// the issue date plus the payment terms and never changes afterwards.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        invoice_number: String,
        client_id: Option<String>,
        project_id: Option<String>,
        tax_rate: Decimal,
        discount_amount: Decimal,
        issue_date: NaiveDate,
        payment_terms_days: u32,
    ) -> Result<Self> {
        money::validate_tax_rate(tax_rate).map_err(AppError::validation)?;
        money::validate_amount(discount_amount, "Discount amount").map_err(AppError::validation)?;

        if invoice_number.trim().is_empty() {
            return Err(AppError::validation("Invoice number cannot be empty"));
        }

        let due_date = issue_date
            .checked_add_days(Days::new(payment_terms_days as u64))
            .ok_or_else(|| AppError::validation("Payment terms overflow the calendar"))?;

        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            client_id,
            project_id,
            invoice_number,
            subtotal: Decimal::ZERO,
            tax_rate,
            tax_amount: Decimal::ZERO,
            discount_amount,
            total_amount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            status: InvoiceStatus::Draft,
            issue_date,
            due_date,
            sent_at: None,
            viewed_at: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Recompute subtotal, tax_amount, and total_amount from line items
    ///
    /// The three fields always change together so no reader can observe a
    /// stale tax next to a fresh subtotal.
    pub fn recompute_totals(&mut self, items: &[InvoiceItem]) {
        let totals = TotalsCalculator::new().compute(items, self.discount_amount, self.tax_rate);

        self.subtotal = totals.subtotal;
        self.tax_amount = totals.tax_amount;
        self.total_amount = totals.total_amount;
        self.updated_at = Utc::now();
    }

    /// Recompute paid_amount from the payment ledger
    pub fn recompute_paid(&mut self, payments: &[InvoicePayment]) {
        self.paid_amount = super::payment::total_paid(payments);
        self.updated_at = Utc::now();
    }

    /// Outstanding balance; negative under overpayment
    pub fn balance_due(&self) -> Decimal {
        self.total_amount - self.paid_amount
    }

    /// Line items and invoice-level amounts may only change in draft
    pub fn is_mutable(&self) -> bool {
        self.status == InvoiceStatus::Draft
    }

    /// Apply one lifecycle event
    ///
    /// The full transition table lives in this match; every (status, event)
    /// pair not listed is rejected with InvalidStateTransition, including
    /// every event against a terminal invoice.
    pub fn apply_event(&mut self, event: LifecycleEvent, now: DateTime<Utc>) -> Result<()> {
        use InvoiceStatus::*;
        use LifecycleEvent::*;

        if self.status.is_terminal() {
            return Err(AppError::invalid_transition(format!(
                "Invoice {} is {} and accepts no further events",
                self.invoice_number, self.status
            )));
        }

        match (self.status, event) {
            (Draft, Send) => {
                self.status = Sent;
                if self.sent_at.is_none() {
                    self.sent_at = Some(now);
                }
            }
            (Sent, MarkViewed) => {
                self.status = Viewed;
                if self.viewed_at.is_none() {
                    self.viewed_at = Some(now);
                }
            }
            (Sent | Viewed | Partial | Overdue, PaymentRecorded) => {
                // A fully paid invoice is never overdue, whatever the date
                if self.paid_amount >= self.total_amount {
                    self.status = Paid;
                    if self.paid_at.is_none() {
                        self.paid_at = Some(now);
                    }
                } else if self.paid_amount > Decimal::ZERO && self.status != Overdue {
                    self.status = Partial;
                }
            }
            (_, Cancel) => {
                self.status = Cancelled;
            }
            (status, event) => {
                return Err(AppError::invalid_transition(format!(
                    "Event {} is not legal while invoice {} is {}",
                    event, self.invoice_number, status
                )));
            }
        }

        self.updated_at = now;
        Ok(())
    }

    /// Point-in-time overdue check, performed on read
    ///
    /// Flips sent/viewed/partial invoices past their due date to overdue.
    /// Returns true when the status changed. Not an event: a paid or
    /// cancelled invoice is simply left alone.
    pub fn evaluate_overdue(&mut self, today: NaiveDate) -> bool {
        use InvoiceStatus::*;

        let eligible = matches!(self.status, Sent | Viewed | Partial);
        if eligible && today > self.due_date && self.paid_amount < self.total_amount {
            self.status = Overdue;
            self.updated_at = Utc::now();
            return true;
        }

        false
    }
}

// Request/response DTOs

/// Request body for creating an invoice
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    pub client_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(default)]
    pub items: Vec<CreateItemRequest>,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    /// Defaults to today when omitted
    pub issue_date: Option<NaiveDate>,
    /// Defaults to the configured payment terms when omitted
    pub payment_terms_days: Option<u32>,
}

/// One line item within a create or update-items request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Request body for replacing an invoice's line items
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemsRequest {
    pub items: Vec<CreateItemRequest>,
}

/// Request body for recording a payment
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

/// Invoice representation returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub invoice_number: String,
    pub client_id: Option<String>,
    pub project_id: Option<String>,
    pub status: InvoiceStatus,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_due: Decimal,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub sent_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<InvoiceItem>,
    pub payments: Vec<InvoicePayment>,
}

impl InvoiceResponse {
    pub fn from_parts(
        invoice: Invoice,
        items: Vec<InvoiceItem>,
        payments: Vec<InvoicePayment>,
    ) -> Self {
        let balance_due = invoice.balance_due();

        Self {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            client_id: invoice.client_id,
            project_id: invoice.project_id,
            status: invoice.status,
            subtotal: invoice.subtotal,
            tax_rate: invoice.tax_rate,
            tax_amount: invoice.tax_amount,
            discount_amount: invoice.discount_amount,
            total_amount: invoice.total_amount,
            paid_amount: invoice.paid_amount,
            balance_due,
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            sent_at: invoice.sent_at,
            viewed_at: invoice.viewed_at,
            paid_at: invoice.paid_at,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
            items,
            payments,
        }
    }
}
