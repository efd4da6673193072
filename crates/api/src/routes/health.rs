use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Liveness report for the catalog service.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answered, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether new product and category images can be written.
    pub storage_healthy: bool,
}

/// GET /health -- database reachability and image storage writability.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db, storage) = tokio::join!(
        catalog_db::health_check(&state.pool),
        state.storage.check_writable(),
    );

    if let Err(e) = &db {
        tracing::warn!(error = %e, "Health check: database unreachable");
    }
    if let Err(e) = &storage {
        tracing::warn!(error = %e, "Health check: image storage not writable");
    }

    let db_healthy = db.is_ok();
    let storage_healthy = storage.is_ok();
    Json(HealthResponse {
        status: if db_healthy && storage_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        storage_healthy,
    })
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
