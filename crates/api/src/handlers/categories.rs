//! Handlers for category administration.
//!
//! Mutations take `multipart/form-data` so an image can ride along with the
//! form fields. All endpoints require a verified [`AdminSession`].

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::types::DbId;

use crate::error::AppResult;
use crate::forms::FormData;
use crate::middleware::auth::AdminSession;
use crate::response::{ActionResponse, DataResponse};
use crate::services::{catalog, categories};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/categories
///
/// Every category ordered by display order then name, with its parent.
pub async fn list_categories(
    _session: AdminSession,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let categories = catalog::list_categories(&state).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/admin/categories/create
pub async fn create_form(
    _session: AdminSession,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let options = catalog::category_create_form(&state).await?;
    Ok(Json(DataResponse { data: options }))
}

/// GET /api/v1/admin/categories/{id}
pub async fn get_category(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = catalog::category_detail(&state, id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/admin/categories/{id}/edit
pub async fn edit_form(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let form = catalog::category_edit_form(&state, id).await?;
    Ok(Json(DataResponse { data: form }))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/categories
///
/// Fields: `name`, `description`, `display_order`, `parent_id` (`none` for a
/// top-level category), `is_promotional`, optional file `image`.
pub async fn create_category(
    session: AdminSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = FormData::read(multipart).await?;
    let image = form.take_file("image");

    let category = categories::create(&state, &form.category_form(), image).await?;

    tracing::info!(category_id = category.id, user_id = session.user_id, "Category created via API");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse {
            data: category,
            message: "Category created successfully.",
        }),
    ))
}

/// PUT /api/v1/admin/categories/{id}
///
/// Same fields as create. A new `image` replaces the stored one.
pub async fn update_category(
    session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = FormData::read(multipart).await?;
    let image = form.take_file("image");

    let category = categories::update(&state, id, &form.category_form(), image).await?;

    tracing::info!(category_id = id, user_id = session.user_id, "Category updated via API");

    Ok(Json(ActionResponse {
        data: category,
        message: "Category updated successfully.",
    }))
}

/// DELETE /api/v1/admin/categories/{id}
///
/// Refused with 409 while any product or subcategory still references it.
pub async fn delete_category(
    session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = categories::delete(&state, id).await?;

    tracing::info!(category_id = id, user_id = session.user_id, "Category deleted via API");

    Ok(Json(ActionResponse {
        data: category,
        message: "Category deleted successfully.",
    }))
}
