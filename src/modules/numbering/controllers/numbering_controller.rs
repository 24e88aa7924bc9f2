use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::middleware::auth::UserId;
use crate::modules::numbering::repositories::SequenceRepository;

/// Request body for updating numbering settings
#[derive(Debug, Deserialize)]
pub struct UpdateNumberingRequest {
    pub prefix: String,
    pub next_value: u64,
}

/// Get the caller's numbering settings
/// GET /numbering
pub async fn get_numbering(
    repo: web::Data<Arc<dyn SequenceRepository>>,
    user_id: UserId,
) -> Result<HttpResponse, AppError> {
    let sequence = repo.get(&user_id.0).await?;

    Ok(HttpResponse::Ok().json(sequence))
}

/// Update the caller's numbering settings
/// PUT /numbering
///
/// Lowering next_value below numbers already handed out is caught by the
/// per-user uniqueness constraint at the next allocation, not here.
pub async fn update_numbering(
    repo: web::Data<Arc<dyn SequenceRepository>>,
    user_id: UserId,
    request: web::Json<UpdateNumberingRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    let sequence = repo
        .update(&user_id.0, request.prefix, request.next_value)
        .await?;

    Ok(HttpResponse::Ok().json(sequence))
}

/// Configure numbering routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/numbering")
            .route("", web::get().to(get_numbering))
            .route("", web::put().to(update_numbering)),
    );
}
