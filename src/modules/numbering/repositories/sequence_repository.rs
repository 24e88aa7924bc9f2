// Invoice number allocation against MySQL.
//
// Allocation is a single UPDATE using LAST_INSERT_ID(expr): the statement
// both reads the current value and advances the counter, so two concurrent
// allocations for the same user serialize on the row lock and can never
// observe the same sequence. There is no read-then-write window.

use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::numbering::models::NumberSequence;

/// Allocates unique, sequential invoice numbers per user
#[async_trait]
pub trait SequenceRepository: Send + Sync {
    /// Return the next invoice number for this user, advancing the counter
    async fn allocate(&self, user_id: &str) -> Result<String>;

    /// Current numbering settings, defaults when none are stored yet
    async fn get(&self, user_id: &str) -> Result<NumberSequence>;

    /// Store new numbering settings for this user
    async fn update(&self, user_id: &str, prefix: String, next_value: u64)
        -> Result<NumberSequence>;
}

/// MySQL-backed sequence repository
pub struct MySqlSequenceRepository {
    pool: MySqlPool,
    default_prefix: String,
    default_start: u64,
}

impl MySqlSequenceRepository {
    pub fn new(pool: MySqlPool, default_prefix: String, default_start: u64) -> Self {
        Self {
            pool,
            default_prefix,
            default_start,
        }
    }

    /// Create the sequence row with defaults if this user has none yet
    async fn provision(&self, user_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT IGNORE INTO invoice_sequences (user_id, prefix, next_value)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&self.default_prefix)
        .bind(self.default_start)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::allocation(format!("Failed to provision sequence: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl SequenceRepository for MySqlSequenceRepository {
    async fn allocate(&self, user_id: &str) -> Result<String> {
        self.provision(user_id).await?;

        let sequence = self.get(user_id).await?;

        // Atomic fetch-and-increment: LAST_INSERT_ID(next_value) captures the
        // value being handed out while the same statement advances the column.
        let result = sqlx::query(
            r#"
            UPDATE invoice_sequences
            SET next_value = LAST_INSERT_ID(next_value) + 1
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::allocation(format!("Failed to advance sequence: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::allocation(format!(
                "No sequence row for user '{}'",
                user_id
            )));
        }

        let allocated = result.last_insert_id();
        if allocated == 0 {
            return Err(AppError::allocation("Sequence returned an empty value"));
        }

        Ok(NumberSequence::format_number(&sequence.prefix, allocated))
    }

    async fn get(&self, user_id: &str) -> Result<NumberSequence> {
        let sequence = sqlx::query_as::<_, NumberSequence>(
            r#"
            SELECT user_id, prefix, next_value
            FROM invoice_sequences
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sequence.unwrap_or_else(|| NumberSequence {
            user_id: user_id.to_string(),
            prefix: self.default_prefix.clone(),
            next_value: self.default_start,
        }))
    }

    async fn update(
        &self,
        user_id: &str,
        prefix: String,
        next_value: u64,
    ) -> Result<NumberSequence> {
        NumberSequence::validate_prefix(&prefix)?;
        NumberSequence::validate_next_value(next_value)?;

        sqlx::query(
            r#"
            INSERT INTO invoice_sequences (user_id, prefix, next_value)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE prefix = VALUES(prefix), next_value = VALUES(next_value)
            "#,
        )
        .bind(user_id)
        .bind(&prefix)
        .bind(next_value)
        .execute(&self.pool)
        .await?;

        Ok(NumberSequence {
            user_id: user_id.to_string(),
            prefix,
            next_value,
        })
    }
}
