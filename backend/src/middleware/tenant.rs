//! Tenant context middleware
//!
//! Authentication and tenant resolution live in an upstream gateway; by the
//! time a request reaches this service it carries the resolved company and
//! actor ids in headers. This middleware lifts them into request extensions
//! so every handler gets a typed `TenantCtx`.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::error::{ErrorDetail, ErrorResponse};

/// Header carrying the resolved tenant id
pub const COMPANY_ID_HEADER: &str = "x-company-id";
/// Header carrying the acting user id
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Resolved tenant scope for a request
#[derive(Clone, Copy, Debug)]
pub struct TenantContext {
    pub company_id: Uuid,
    pub actor_id: Uuid,
}

/// Middleware that requires both tenant headers on every request
pub async fn tenant_middleware(mut request: Request<Body>, next: Next) -> Response {
    let company_id = match header_uuid(&request, COMPANY_ID_HEADER) {
        Ok(id) => id,
        Err(msg) => return missing_tenant_response(msg),
    };
    let actor_id = match header_uuid(&request, ACTOR_ID_HEADER) {
        Ok(id) => id,
        Err(msg) => return missing_tenant_response(msg),
    };

    request.extensions_mut().insert(TenantContext {
        company_id,
        actor_id,
    });

    next.run(request).await
}

fn header_uuid(request: &Request<Body>, name: &str) -> Result<Uuid, String> {
    let value = request
        .headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| format!("Missing {} header", name))?;

    Uuid::parse_str(value).map_err(|_| format!("Invalid {} header", name))
}

fn missing_tenant_response(message: String) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail {
            code: "TENANT_CONTEXT_REQUIRED".to_string(),
            message,
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for the tenant context
/// Use this in handlers to get the current company and actor
#[derive(Clone, Copy, Debug)]
pub struct TenantCtx(pub TenantContext);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for TenantCtx
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .map(TenantCtx)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: ErrorDetail {
                        code: "TENANT_CONTEXT_REQUIRED".to_string(),
                        message: "Tenant context missing from request".to_string(),
                        field: None,
                    },
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}
