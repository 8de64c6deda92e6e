use std::sync::Arc;

use axum::extract::Extension;
use serde_json::{json, Value};

use crate::api::CONTACTS_PATH;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ContactService;

/// GET / - Service description
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "Contactbook API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "contacts": CONTACTS_PATH,
            "contact": format!("{}/:id", CONTACTS_PATH),
            "health": "/health",
        }
    }))
}

/// GET /health - Store connectivity check
pub async fn health(Extension(service): Extension<Arc<ContactService>>) -> ApiResult<Value> {
    let now = chrono::Utc::now();

    match service.health_check().await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "store": "ok"
        }))),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            Err(ApiError::service_unavailable("Contact store unavailable"))
        }
    }
}
