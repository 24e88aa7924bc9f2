use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::modules::invoices::models::{Invoice, InvoiceItem, InvoicePayment};

/// Business details printed on the document header
///
/// Supplied by the caller per render; this core does not persist profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub business_name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

const INVOICE_TEMPLATE: &str = include_str!("../templates/invoice.html");

/// Renders invoices as standalone HTML documents
///
/// A read-only consumer of the invoice's computed fields; nothing here
/// recalculates money.
pub struct DocumentRenderer {
    env: Environment<'static>,
}

impl DocumentRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("invoice.html", INVOICE_TEMPLATE)
            .expect("invoice template is embedded and must parse");

        Self { env }
    }

    pub fn render(
        &self,
        invoice: &Invoice,
        items: &[InvoiceItem],
        payments: &[InvoicePayment],
        profile: &BusinessProfile,
    ) -> Result<String> {
        let template = self.env.get_template("invoice.html")?;

        let html = template.render(context! {
            invoice => invoice,
            items => items,
            payments => payments,
            profile => profile,
            balance_due => invoice.balance_due(),
        })?;

        Ok(html)
    }
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new()
    }
}
