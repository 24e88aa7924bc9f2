use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{AppError, Result};

/// Per-user invoice numbering state
///
/// `next_value` is the sequence the next allocation returns. The counter only
/// moves forward; numbers are never reused, deleted invoices included.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NumberSequence {
    pub user_id: String,

    /// Prefix prepended to the sequence, default "INV"
    pub prefix: String,

    /// Value handed out by the next allocation
    pub next_value: u64,
}

impl NumberSequence {
    /// Render a full invoice number from prefix and sequence
    pub fn format_number(prefix: &str, sequence: u64) -> String {
        format!("{}{}", prefix, sequence)
    }

    /// Validate a user-supplied prefix
    pub fn validate_prefix(prefix: &str) -> Result<()> {
        if prefix.trim().is_empty() {
            return Err(AppError::validation("Number prefix cannot be empty"));
        }

        if prefix.len() > 16 {
            return Err(AppError::validation(
                "Number prefix cannot exceed 16 characters",
            ));
        }

        Ok(())
    }

    /// Validate a user-supplied sequence value
    pub fn validate_next_value(next_value: u64) -> Result<()> {
        if next_value == 0 {
            return Err(AppError::validation("Sequence value must be at least 1"));
        }

        Ok(())
    }
}
