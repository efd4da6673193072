use std::sync::Arc;

use catalog_core::storage::FileStorage;
use catalog_core::upload::UploadPolicy;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: catalog_db::DbPool,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Where uploaded image files live.
    pub storage: Arc<dyn FileStorage>,
    /// Limits applied to every uploaded image.
    pub uploads: UploadPolicy,
}
