use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::documents::DocumentRenderer;
use crate::modules::documents::services::document_renderer::BusinessProfile;
use crate::modules::invoices::models::{
    CreateInvoiceRequest, Invoice, InvoiceItem, InvoicePayment, InvoiceResponse, InvoiceStatus,
    LifecycleEvent, RecordPaymentRequest, UpdateItemsRequest,
};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::numbering::repositories::SequenceRepository;

/// Service for invoice business logic
///
/// Owns the one-way flows of the financial engine: items feed totals, the
/// payment ledger feeds paid amount and status, and the numbering allocator
/// is consulted exactly once per created invoice.
pub struct InvoiceService {
    invoice_repo: Arc<dyn InvoiceRepository>,
    sequence_repo: Arc<dyn SequenceRepository>,
    renderer: DocumentRenderer,
    default_payment_terms_days: u32,
}

impl InvoiceService {
    pub fn new(
        invoice_repo: Arc<dyn InvoiceRepository>,
        sequence_repo: Arc<dyn SequenceRepository>,
        renderer: DocumentRenderer,
        default_payment_terms_days: u32,
    ) -> Self {
        Self {
            invoice_repo,
            sequence_repo,
            renderer,
            default_payment_terms_days,
        }
    }

    /// Create a new invoice in draft
    ///
    /// Allocates the invoice number first; if allocation fails the creation
    /// fails whole and nothing is persisted. Items are optional at creation,
    /// an empty invoice is legal while it stays in draft.
    pub async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
        user_id: &str,
    ) -> Result<InvoiceResponse> {
        let issue_date = request
            .issue_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let payment_terms_days = request
            .payment_terms_days
            .unwrap_or(self.default_payment_terms_days);

        let invoice_number = self.sequence_repo.allocate(user_id).await?;

        let mut invoice = Invoice::new(
            user_id.to_string(),
            invoice_number,
            request.client_id,
            request.project_id,
            request.tax_rate,
            request.discount_amount,
            issue_date,
            payment_terms_days,
        )?;

        // Validate every item before anything is persisted
        let items = Self::build_items(&invoice.id, &request.items)?;
        invoice.recompute_totals(&items);

        self.invoice_repo.create(&invoice, &items).await?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total_amount,
            "Invoice created"
        );

        Ok(InvoiceResponse::from_parts(invoice, items, Vec::new()))
    }

    /// Fetch one invoice, re-deriving overdue before returning
    pub async fn get_invoice(&self, id: &str, user_id: &str) -> Result<InvoiceResponse> {
        let mut invoice = self.fetch(id, user_id).await?;

        // Point-in-time overdue check; persisted so later filters see it
        if invoice.evaluate_overdue(Utc::now().date_naive()) {
            self.invoice_repo.update_status(&invoice).await?;
        }

        let items = self.invoice_repo.find_items(&invoice.id).await?;
        let payments = self.invoice_repo.find_payments(&invoice.id).await?;

        Ok(InvoiceResponse::from_parts(invoice, items, payments))
    }

    /// List a user's invoices
    ///
    /// Overdue is derived per row for the response; the stored status is
    /// refreshed lazily on the next single-invoice read.
    pub async fn list_invoices(
        &self,
        user_id: &str,
        status: Option<InvoiceStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InvoiceResponse>> {
        let invoices = self
            .invoice_repo
            .list(user_id, status, limit, offset)
            .await?;

        let today = Utc::now().date_naive();
        let mut responses = Vec::with_capacity(invoices.len());
        for mut invoice in invoices {
            invoice.evaluate_overdue(today);
            let items = self.invoice_repo.find_items(&invoice.id).await?;
            let payments = self.invoice_repo.find_payments(&invoice.id).await?;
            responses.push(InvoiceResponse::from_parts(invoice, items, payments));
        }

        Ok(responses)
    }

    /// Replace the line items and recompute all monetary fields
    pub async fn update_items(
        &self,
        id: &str,
        user_id: &str,
        request: UpdateItemsRequest,
    ) -> Result<InvoiceResponse> {
        let mut invoice = self.fetch(id, user_id).await?;

        if !invoice.is_mutable() {
            return Err(AppError::validation(format!(
                "Invoice {} is {} and its items can no longer be edited",
                invoice.invoice_number, invoice.status
            )));
        }

        let items = Self::build_items(&invoice.id, &request.items)?;
        invoice.recompute_totals(&items);

        self.invoice_repo.replace_items(&invoice, &items).await?;

        let payments = self.invoice_repo.find_payments(&invoice.id).await?;
        Ok(InvoiceResponse::from_parts(invoice, items, payments))
    }

    /// Append a payment to the ledger and re-derive the status
    pub async fn record_payment(
        &self,
        id: &str,
        user_id: &str,
        request: RecordPaymentRequest,
    ) -> Result<InvoiceResponse> {
        let mut invoice = self.fetch(id, user_id).await?;

        let payment = InvoicePayment::new(
            invoice.id.clone(),
            request.amount,
            request.payment_date,
            request.payment_method,
            request.transaction_id,
        )?;

        let mut payments = self.invoice_repo.find_payments(&invoice.id).await?;
        payments.push(payment.clone());

        invoice.recompute_paid(&payments);
        // Rejects payments against draft and terminal invoices; nothing has
        // been persisted at this point, so the failure leaves no trace.
        invoice.apply_event(LifecycleEvent::PaymentRecorded, Utc::now())?;

        self.invoice_repo.record_payment(&invoice, &payment).await?;

        info!(
            invoice_id = %invoice.id,
            amount = %payment.amount,
            paid_amount = %invoice.paid_amount,
            status = %invoice.status,
            "Payment recorded"
        );

        let items = self.invoice_repo.find_items(&invoice.id).await?;
        Ok(InvoiceResponse::from_parts(invoice, items, payments))
    }

    /// Apply a user-triggered lifecycle event (send, mark viewed, cancel)
    pub async fn transition(
        &self,
        id: &str,
        user_id: &str,
        event: LifecycleEvent,
    ) -> Result<InvoiceResponse> {
        let mut invoice = self.fetch(id, user_id).await?;

        invoice.apply_event(event, Utc::now())?;
        self.invoice_repo.update_status(&invoice).await?;

        info!(
            invoice_id = %invoice.id,
            event = %event,
            status = %invoice.status,
            "Invoice transitioned"
        );

        let items = self.invoice_repo.find_items(&invoice.id).await?;
        let payments = self.invoice_repo.find_payments(&invoice.id).await?;
        Ok(InvoiceResponse::from_parts(invoice, items, payments))
    }

    /// Delete an invoice, cascading to its items and payments
    pub async fn delete_invoice(&self, id: &str, user_id: &str) -> Result<()> {
        self.invoice_repo.delete(id, user_id).await?;

        info!(invoice_id = %id, "Invoice deleted");
        Ok(())
    }

    /// Render the invoice document as HTML bytes
    pub async fn render_document(
        &self,
        id: &str,
        user_id: &str,
        profile: BusinessProfile,
    ) -> Result<String> {
        let invoice = self.fetch(id, user_id).await?;
        let items = self.invoice_repo.find_items(&invoice.id).await?;
        let payments = self.invoice_repo.find_payments(&invoice.id).await?;

        self.renderer.render(&invoice, &items, &payments, &profile)
    }

    async fn fetch(&self, id: &str, user_id: &str) -> Result<Invoice> {
        self.invoice_repo
            .find_by_id(id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", id)))
    }

    fn build_items(
        invoice_id: &str,
        requests: &[crate::modules::invoices::models::CreateItemRequest],
    ) -> Result<Vec<InvoiceItem>> {
        requests
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                InvoiceItem::new(
                    invoice_id.to_string(),
                    item.description.clone(),
                    item.quantity,
                    item.unit_price,
                    idx as i32,
                )
            })
            .collect()
    }
}
