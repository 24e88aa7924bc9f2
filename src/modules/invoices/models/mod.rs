mod invoice;
mod invoice_item;
pub mod payment;

pub use invoice::{
    CreateInvoiceRequest, CreateItemRequest, Invoice, InvoiceResponse, InvoiceStatus,
    LifecycleEvent, RecordPaymentRequest, UpdateItemsRequest,
};
pub use invoice_item::InvoiceItem;
pub use payment::InvoicePayment;
