// MySQL persistence for invoices, line items, and the payment ledger.
//
// Every logical operation that touches more than one row runs inside a
// single transaction: create (invoice + items), replace_items (items +
// recomputed totals), record_payment (ledger row + paid_amount + status).
// A concurrent reader never observes a half-applied operation.

use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::invoices::models::{Invoice, InvoiceItem, InvoicePayment, InvoiceStatus};

/// Repository seam for invoice persistence
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Persist a new invoice together with its line items
    async fn create(&self, invoice: &Invoice, items: &[InvoiceItem]) -> Result<()>;

    /// Fetch one invoice owned by the user
    async fn find_by_id(&self, id: &str, user_id: &str) -> Result<Option<Invoice>>;

    /// Line items in display order
    async fn find_items(&self, invoice_id: &str) -> Result<Vec<InvoiceItem>>;

    /// Payment ledger in recording order
    async fn find_payments(&self, invoice_id: &str) -> Result<Vec<InvoicePayment>>;

    /// List a user's invoices, optionally filtered by status
    async fn list(
        &self,
        user_id: &str,
        status: Option<InvoiceStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invoice>>;

    /// Replace all line items and persist the recomputed monetary fields
    async fn replace_items(&self, invoice: &Invoice, items: &[InvoiceItem]) -> Result<()>;

    /// Append a payment and persist the re-derived paid amount and status
    async fn record_payment(&self, invoice: &Invoice, payment: &InvoicePayment) -> Result<()>;

    /// Persist the current status and lifecycle timestamps
    async fn update_status(&self, invoice: &Invoice) -> Result<()>;

    /// Delete an invoice; items and payments cascade
    async fn delete(&self, id: &str, user_id: &str) -> Result<()>;
}

/// MySQL-backed invoice repository
pub struct MySqlInvoiceRepository {
    pool: MySqlPool,
}

impl MySqlInvoiceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn insert_items(
        tx: &mut Transaction<'_, MySql>,
        items: &[InvoiceItem],
    ) -> Result<()> {
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, description, quantity, unit_price, total_price, sort_order
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(&item.invoice_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .bind(item.sort_order)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl InvoiceRepository for MySqlInvoiceRepository {
    async fn create(&self, invoice: &Invoice, items: &[InvoiceItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, user_id, client_id, project_id, invoice_number,
                subtotal, tax_rate, tax_amount, discount_amount, total_amount, paid_amount,
                status, issue_date, due_date, sent_at, viewed_at, paid_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.user_id)
        .bind(&invoice.client_id)
        .bind(&invoice.project_id)
        .bind(&invoice.invoice_number)
        .bind(invoice.subtotal)
        .bind(invoice.tax_rate)
        .bind(invoice.tax_amount)
        .bind(invoice.discount_amount)
        .bind(invoice.total_amount)
        .bind(invoice.paid_amount)
        .bind(invoice.status)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.sent_at)
        .bind(invoice.viewed_at)
        .bind(invoice.paid_at)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    // The sequence handed out a number that already exists;
                    // the creation fails whole, nothing is persisted.
                    return AppError::allocation(format!(
                        "Invoice number '{}' is already taken",
                        invoice.invoice_number
                    ));
                }
            }
            AppError::Database(e)
        })?;

        Self::insert_items(&mut tx, items).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str, user_id: &str) -> Result<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT
                id, user_id, client_id, project_id, invoice_number,
                subtotal, tax_rate, tax_amount, discount_amount, total_amount, paid_amount,
                status, issue_date, due_date, sent_at, viewed_at, paid_at,
                created_at, updated_at
            FROM invoices
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    async fn find_items(&self, invoice_id: &str) -> Result<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT id, invoice_id, description, quantity, unit_price, total_price, sort_order
            FROM invoice_items
            WHERE invoice_id = ?
            ORDER BY sort_order
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn find_payments(&self, invoice_id: &str) -> Result<Vec<InvoicePayment>> {
        let payments = sqlx::query_as::<_, InvoicePayment>(
            r#"
            SELECT id, invoice_id, amount, payment_date, payment_method, transaction_id, created_at
            FROM invoice_payments
            WHERE invoice_id = ?
            ORDER BY created_at, id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn list(
        &self,
        user_id: &str,
        status: Option<InvoiceStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invoice>> {
        let limit = limit.clamp(1, 100);
        let offset = offset.max(0);

        let invoices = match status {
            Some(status) => {
                sqlx::query_as::<_, Invoice>(
                    r#"
                    SELECT
                        id, user_id, client_id, project_id, invoice_number,
                        subtotal, tax_rate, tax_amount, discount_amount, total_amount, paid_amount,
                        status, issue_date, due_date, sent_at, viewed_at, paid_at,
                        created_at, updated_at
                    FROM invoices
                    WHERE user_id = ? AND status = ?
                    ORDER BY created_at DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(user_id)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Invoice>(
                    r#"
                    SELECT
                        id, user_id, client_id, project_id, invoice_number,
                        subtotal, tax_rate, tax_amount, discount_amount, total_amount, paid_amount,
                        status, issue_date, due_date, sent_at, viewed_at, paid_at,
                        created_at, updated_at
                    FROM invoices
                    WHERE user_id = ?
                    ORDER BY created_at DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(invoices)
    }

    async fn replace_items(&self, invoice: &Invoice, items: &[InvoiceItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?")
            .bind(&invoice.id)
            .execute(&mut *tx)
            .await?;

        Self::insert_items(&mut tx, items).await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET subtotal = ?, tax_amount = ?, total_amount = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(invoice.subtotal)
        .bind(invoice.tax_amount)
        .bind(invoice.total_amount)
        .bind(invoice.updated_at)
        .bind(&invoice.id)
        .bind(&invoice.user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice '{}' not found",
                invoice.id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn record_payment(&self, invoice: &Invoice, payment: &InvoicePayment) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoice_payments (
                id, invoice_id, amount, payment_date, payment_method, transaction_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.invoice_id)
        .bind(payment.amount)
        .bind(payment.payment_date)
        .bind(&payment.payment_method)
        .bind(&payment.transaction_id)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET paid_amount = ?, status = ?, paid_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(invoice.paid_amount)
        .bind(invoice.status)
        .bind(invoice.paid_at)
        .bind(invoice.updated_at)
        .bind(&invoice.id)
        .bind(&invoice.user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice '{}' not found",
                invoice.id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_status(&self, invoice: &Invoice) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET status = ?, sent_at = ?, viewed_at = ?, paid_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(invoice.status)
        .bind(invoice.sent_at)
        .bind(invoice.viewed_at)
        .bind(invoice.paid_at)
        .bind(invoice.updated_at)
        .bind(&invoice.id)
        .bind(&invoice.user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice '{}' not found",
                invoice.id
            )));
        }

        Ok(())
    }

    async fn delete(&self, id: &str, user_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Invoice '{}' not found", id)));
        }

        Ok(())
    }
}
