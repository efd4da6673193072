//! Handlers for product administration.
//!
//! All endpoints require a verified [`AdminSession`].

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::types::DbId;

use crate::error::AppResult;
use crate::forms::FormData;
use crate::middleware::auth::AdminSession;
use crate::query::ProductListParams;
use crate::response::{ActionResponse, DataResponse};
use crate::services::{catalog, products};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/products
///
/// One page of products, newest first, each with its categories and
/// primary image.
pub async fn list_products(
    _session: AdminSession,
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> AppResult<impl IntoResponse> {
    let page = catalog::list_products(&state, params).await?;
    Ok(Json(page))
}

/// GET /api/v1/admin/products/create
pub async fn create_form(
    _session: AdminSession,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let options = catalog::product_create_form(&state).await?;
    Ok(Json(DataResponse { data: options }))
}

/// GET /api/v1/admin/products/{id}
pub async fn get_product(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = catalog::product_detail(&state, id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/admin/products/{id}/edit
pub async fn edit_form(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let form = catalog::product_edit_form(&state, id).await?;
    Ok(Json(DataResponse { data: form }))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/products
///
/// Multipart fields: `title`, `description`, `status`, `regular_price`,
/// `compare_at_price`, `cost_per_item`, `stock_quantity`, `sku`,
/// `categories[]`, and files `images[]`. The first image becomes primary.
pub async fn create_product(
    session: AdminSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = FormData::read(multipart).await?;
    let files = form.take_files("images");

    let product = products::create(&state, &form.product_form(), files).await?;
    let detail = catalog::product_detail(&state, product.id).await?;

    tracing::info!(product_id = product.id, user_id = session.user_id, "Product created via API");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse {
            data: detail,
            message: "Product created successfully.",
        }),
    ))
}

/// PUT /api/v1/admin/products/{id}
///
/// Same fields as create, without files. `categories[]` replaces the
/// product's membership wholesale.
pub async fn update_product(
    session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = FormData::read(multipart).await?;

    products::update(&state, id, &form.product_form()).await?;
    let detail = catalog::product_detail(&state, id).await?;

    tracing::info!(product_id = id, user_id = session.user_id, "Product updated via API");

    Ok(Json(ActionResponse {
        data: detail,
        message: "Product updated successfully.",
    }))
}

/// DELETE /api/v1/admin/products/{id}
pub async fn delete_product(
    session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    products::delete(&state, id).await?;

    tracing::info!(product_id = id, user_id = session.user_id, "Product deleted via API");

    Ok(Json(ActionResponse {
        data: serde_json::json!({ "id": id }),
        message: "Product deleted successfully.",
    }))
}
