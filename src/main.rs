use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faktura::config::Config;
use faktura::middleware::{ApiKeyAuth, RequestId};
use faktura::modules::documents::DocumentRenderer;
use faktura::modules::invoices::controllers::invoice_controller;
use faktura::modules::invoices::repositories::MySqlInvoiceRepository;
use faktura::modules::invoices::services::InvoiceService;
use faktura::modules::numbering::controllers::numbering_controller;
use faktura::modules::numbering::repositories::{MySqlSequenceRepository, SequenceRepository};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faktura=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    tracing::info!("Starting faktura invoicing service");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    // Wire repositories and services
    let invoice_repo = Arc::new(MySqlInvoiceRepository::new(db_pool.clone()));
    let sequence_repo: Arc<dyn SequenceRepository> = Arc::new(MySqlSequenceRepository::new(
        db_pool.clone(),
        config.app.default_number_prefix.clone(),
        config.app.default_number_start,
    ));
    let invoice_service = Arc::new(InvoiceService::new(
        invoice_repo,
        sequence_repo.clone(),
        DocumentRenderer::new(),
        config.app.default_payment_terms_days,
    ));

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(ApiKeyAuth::new(db_pool.clone()))
            .wrap(RequestId)
            .wrap(Cors::permissive())
            .app_data(web::Data::new(invoice_service.clone()))
            .app_data(web::Data::new(sequence_repo.clone()))
            .configure(invoice_controller::configure)
            .configure(numbering_controller::configure)
            .route("/health", web::get().to(health_check))
            .route("/", web::get().to(index))
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await.context("HTTP server terminated")
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "faktura"
    }))
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "Faktura Invoicing Service",
        "version": "0.1.0",
        "status": "running"
    }))
}
