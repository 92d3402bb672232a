//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
}

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let status = if storage_reachable(&state).await {
        "ok"
    } else {
        "degraded"
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage.as_str(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if status == "ok" {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[cfg(feature = "postgres")]
async fn storage_reachable(state: &AppState) -> bool {
    match &state.db {
        Some(db) => match db.main.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Database ping failed: {}", e);
                false
            }
        },
        None => true,
    }
}

#[cfg(not(feature = "postgres"))]
async fn storage_reachable(_state: &AppState) -> bool {
    true
}
