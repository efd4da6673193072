//! Handlers for a product's image gallery.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::types::DbId;

use crate::error::AppResult;
use crate::forms::FormData;
use crate::middleware::auth::AdminSession;
use crate::response::ActionResponse;
use crate::services::{images, products};
use crate::state::AppState;

/// POST /api/v1/admin/products/{id}/images
///
/// Append files `images[]` after the existing ones. The current primary
/// image is kept.
pub async fn add_images(
    session: AdminSession,
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = FormData::read(multipart).await?;
    let files = form.take_files("images");

    let added = products::add_images(&state, product_id, files).await?;

    tracing::info!(product_id, count = added.len(), user_id = session.user_id, "Images added via API");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse {
            data: added,
            message: "Images uploaded successfully.",
        }),
    ))
}

/// DELETE /api/v1/admin/products/{id}/images/{image_id}
///
/// An image belonging to another product is reported as not found.
pub async fn remove_image(
    session: AdminSession,
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let removed = images::remove(&state, product_id, image_id).await?;

    tracing::info!(product_id, image_id, user_id = session.user_id, "Image deleted via API");

    Ok(Json(ActionResponse {
        data: removed,
        message: "Image deleted successfully.",
    }))
}

/// POST /api/v1/admin/products/{id}/images/{image_id}/primary
pub async fn set_primary_image(
    session: AdminSession,
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let image = images::set_primary(&state, product_id, image_id).await?;

    tracing::info!(product_id, image_id, user_id = session.user_id, "Primary image set via API");

    Ok(Json(ActionResponse {
        data: image,
        message: "Primary image updated successfully.",
    }))
}
