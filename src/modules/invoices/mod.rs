// Invoices module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Invoice, InvoiceItem, InvoicePayment, InvoiceStatus, LifecycleEvent};
pub use repositories::{InvoiceRepository, MySqlInvoiceRepository};
pub use services::InvoiceService;
