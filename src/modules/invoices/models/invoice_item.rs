// A line item is one billable row on an invoice. Each item derives its
// extended price (quantity x unit_price, rounded half-up to 2 decimal
// places) at construction; the invoice rolls items up into its subtotal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::money;
use crate::core::{AppError, Result};

/// A single billable line on an invoice
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceItem {
    /// Unique identifier (UUID)
    pub id: String,

    /// Owning invoice
    pub invoice_id: String,

    /// Description of the product or service
    pub description: String,

    /// Quantity, must be strictly positive
    pub quantity: Decimal,

    /// Price per unit, must be non-negative
    pub unit_price: Decimal,

    /// Extended price: quantity x unit_price, rounded half-up to 2 dp
    pub total_price: Decimal,

    /// Display position, unique within the invoice
    pub sort_order: i32,
}

impl InvoiceItem {
    /// Create a new line item with validation
    ///
    /// # Arguments
    /// * `invoice_id` - Owning invoice ID
    /// * `description` - Product/service description (non-empty, max 255 chars)
    /// * `quantity` - Must be strictly positive
    /// * `unit_price` - Must be non-negative with at most 2 decimal places
    /// * `sort_order` - Position within the invoice
    pub fn new(
        invoice_id: String,
        description: String,
        quantity: Decimal,
        unit_price: Decimal,
        sort_order: i32,
    ) -> Result<Self> {
        Self::validate_description(&description)?;
        Self::validate_quantity(quantity)?;
        money::validate_amount(unit_price, "Unit price").map_err(AppError::validation)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            invoice_id,
            description,
            quantity,
            unit_price,
            total_price: Self::extended_price(quantity, unit_price),
            sort_order,
        })
    }

    /// Extended price for a quantity at a unit price, rounded half-up to 2 dp
    pub fn extended_price(quantity: Decimal, unit_price: Decimal) -> Decimal {
        money::round_money(quantity * unit_price)
    }

    fn validate_description(description: &str) -> Result<()> {
        if description.trim().is_empty() {
            return Err(AppError::validation("Line item description cannot be empty"));
        }

        if description.len() > 255 {
            return Err(AppError::validation(
                "Line item description cannot exceed 255 characters",
            ));
        }

        Ok(())
    }

    fn validate_quantity(quantity: Decimal) -> Result<()> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Quantity must be positive, got: {}",
                quantity
            )));
        }

        Ok(())
    }
}
