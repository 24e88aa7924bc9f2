use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

/// Application-level settings, including billing defaults applied when a
/// user has no explicit numbering or payment-terms configuration yet.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// Prefix for newly provisioned invoice number sequences
    pub default_number_prefix: String,
    /// First sequence value for newly provisioned number sequences
    pub default_number_start: u64,
    /// Payment terms applied when a create request omits them (net days)
    pub default_payment_terms_days: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                default_number_prefix: env::var("DEFAULT_NUMBER_PREFIX")
                    .unwrap_or_else(|_| "INV".to_string()),
                default_number_start: env::var("DEFAULT_NUMBER_START")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid DEFAULT_NUMBER_START".to_string())
                    })?,
                default_payment_terms_days: env::var("DEFAULT_PAYMENT_TERMS_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid DEFAULT_PAYMENT_TERMS_DAYS".to_string())
                    })?,
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.app.default_number_prefix.trim().is_empty() {
            return Err(AppError::Configuration(
                "Default number prefix must not be empty".to_string(),
            ));
        }

        if self.app.default_number_start == 0 {
            return Err(AppError::Configuration(
                "Default number start must be greater than 0".to_string(),
            ));
        }

        if self.app.default_payment_terms_days == 0 {
            return Err(AppError::Configuration(
                "Default payment terms must be greater than 0 days".to_string(),
            ));
        }

        Ok(())
    }
}
