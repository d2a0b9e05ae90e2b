//! Health check endpoint.

use actix_web::{HttpResponse, web};
use yatube_shared::response::HealthResponse;

use crate::observability::RequestId;
use crate::state::AppState;

#[cfg(feature = "postgres")]
async fn storage_ok(state: &AppState) -> bool {
    match &state.db {
        Some(db) => db.ping().await,
        None => true,
    }
}

#[cfg(not(feature = "postgres"))]
async fn storage_ok(_state: &AppState) -> bool {
    true
}

/// Health check endpoint - returns server status.
///
/// GET /health/
pub async fn health_check(state: web::Data<AppState>, request_id: RequestId) -> HttpResponse {
    let healthy = storage_ok(&state).await;
    if !healthy {
        tracing::warn!(request_id = request_id.as_str(), "Storage ping failed");
    }

    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage_name().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
