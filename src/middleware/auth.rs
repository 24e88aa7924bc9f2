use crate::core::AppError;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use sha2::{Digest, Sha256};
use sqlx::MySqlPool;
use std::future::{ready, Ready};
use std::rc::Rc;

/// Identity of the authenticated caller, extracted from request extensions.
///
/// Inserted by [`ApiKeyAuth`]; handlers take it as an argument.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req.extensions().get::<UserId>().cloned();
        ready(user_id.ok_or_else(|| {
            Error::from(AppError::unauthorized("Request is not authenticated"))
        }))
    }
}

/// API key authentication middleware
///
/// Resolves the `X-API-Key` header to the owning user via a hashed key lookup
/// and stores the [`UserId`] in request extensions.
pub struct ApiKeyAuth {
    pool: MySqlPool,
}

impl ApiKeyAuth {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
            pool: self.pool.clone(),
        }))
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
    pool: MySqlPool,
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let pool = self.pool.clone();

        Box::pin(async move {
            // Health and index endpoints are public
            let path = req.path();
            if path == "/health" || path == "/" {
                return svc.call(req).await;
            }

            let api_key = req
                .headers()
                .get("X-API-Key")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| Error::from(AppError::unauthorized("Missing X-API-Key header")))?;

            let record = lookup_api_key(&pool, api_key).await.map_err(Error::from)?;

            req.extensions_mut().insert(UserId(record.user_id.clone()));
            req.extensions_mut().insert(record);

            svc.call(req).await
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKeyRecord {
    pub id: String,
    pub user_id: String,
    pub is_active: bool,
}

async fn lookup_api_key(pool: &MySqlPool, api_key: &str) -> crate::core::Result<ApiKeyRecord> {
    let record = sqlx::query_as::<_, ApiKeyRecord>(
        r#"
        SELECT id, user_id, is_active
        FROM api_keys
        WHERE key_hash = ?
        LIMIT 1
        "#,
    )
    .bind(hash_api_key(api_key))
    .fetch_optional(pool)
    .await
    .map_err(AppError::Database)?
    .ok_or_else(|| AppError::unauthorized("Invalid API key"))?;

    if !record.is_active {
        return Err(AppError::unauthorized("API key is inactive"));
    }

    // Update last_used_at timestamp (fire and forget)
    let _ = sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = ?")
        .bind(&record.id)
        .execute(pool)
        .await;

    Ok(record)
}

/// Digest used for API key storage and lookup
pub fn hash_api_key(api_key: &str) -> String {
    let digest = Sha256::digest(api_key.as_bytes());
    hex::encode(digest)
}
