use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::middleware::auth::UserId;
use crate::modules::documents::services::document_renderer::BusinessProfile;
use crate::modules::invoices::models::{
    CreateInvoiceRequest, InvoiceStatus, LifecycleEvent, RecordPaymentRequest, UpdateItemsRequest,
};
use crate::modules::invoices::services::invoice_service::InvoiceService;

/// Query parameters for listing invoices
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    pub status: Option<InvoiceStatus>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Create a new invoice
/// POST /invoices
pub async fn create_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user_id: UserId,
    request: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .create_invoice(request.into_inner(), &user_id.0)
        .await?;

    Ok(HttpResponse::Created().json(invoice))
}

/// Get invoice by ID
/// GET /invoices/{id}
pub async fn get_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let invoice = service.get_invoice(&path.into_inner(), &user_id.0).await?;

    Ok(HttpResponse::Ok().json(invoice))
}

/// List invoices for the authenticated user
/// GET /invoices
pub async fn list_invoices(
    service: web::Data<Arc<InvoiceService>>,
    user_id: UserId,
    query: web::Query<ListInvoicesQuery>,
) -> Result<HttpResponse, AppError> {
    let invoices = service
        .list_invoices(&user_id.0, query.status, query.limit, query.offset)
        .await?;

    Ok(HttpResponse::Ok().json(invoices))
}

/// Replace the invoice's line items
/// PUT /invoices/{id}/items
pub async fn update_items(
    service: web::Data<Arc<InvoiceService>>,
    user_id: UserId,
    path: web::Path<String>,
    request: web::Json<UpdateItemsRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .update_items(&path.into_inner(), &user_id.0, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(invoice))
}

/// Record a payment against the invoice
/// POST /invoices/{id}/payments
pub async fn record_payment(
    service: web::Data<Arc<InvoiceService>>,
    user_id: UserId,
    path: web::Path<String>,
    request: web::Json<RecordPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .record_payment(&path.into_inner(), &user_id.0, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(invoice))
}

/// Mark the invoice as sent
/// POST /invoices/{id}/send
pub async fn send_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .transition(&path.into_inner(), &user_id.0, LifecycleEvent::Send)
        .await?;

    Ok(HttpResponse::Ok().json(invoice))
}

/// Mark the invoice as viewed by the recipient
/// POST /invoices/{id}/viewed
pub async fn mark_viewed(
    service: web::Data<Arc<InvoiceService>>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .transition(&path.into_inner(), &user_id.0, LifecycleEvent::MarkViewed)
        .await?;

    Ok(HttpResponse::Ok().json(invoice))
}

/// Cancel the invoice
/// POST /invoices/{id}/cancel
pub async fn cancel_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .transition(&path.into_inner(), &user_id.0, LifecycleEvent::Cancel)
        .await?;

    Ok(HttpResponse::Ok().json(invoice))
}

/// Delete the invoice and everything it owns
/// DELETE /invoices/{id}
pub async fn delete_invoice(
    service: web::Data<Arc<InvoiceService>>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_invoice(&path.into_inner(), &user_id.0).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Render the invoice as an HTML document
/// POST /invoices/{id}/document
pub async fn render_document(
    service: web::Data<Arc<InvoiceService>>,
    user_id: UserId,
    path: web::Path<String>,
    profile: web::Json<BusinessProfile>,
) -> Result<HttpResponse, AppError> {
    let html = service
        .render_document(&path.into_inner(), &user_id.0, profile.into_inner())
        .await?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

/// Configure invoice routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/invoices")
            .route("", web::post().to(create_invoice))
            .route("", web::get().to(list_invoices))
            .route("/{id}", web::get().to(get_invoice))
            .route("/{id}", web::delete().to(delete_invoice))
            .route("/{id}/items", web::put().to(update_items))
            .route("/{id}/payments", web::post().to(record_payment))
            .route("/{id}/send", web::post().to(send_invoice))
            .route("/{id}/viewed", web::post().to(mark_viewed))
            .route("/{id}/cancel", web::post().to(cancel_invoice))
            .route("/{id}/document", web::post().to(render_document)),
    );
}
