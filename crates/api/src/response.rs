//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Mutations add a
//! confirmation `message`; listings add page bounds.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": T, "message": "..." }` returned by every mutation.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T: Serialize> {
    pub data: T,
    pub message: &'static str,
}

/// One page of a listing with the total matching count.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub data: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
