pub mod categories;
pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/categories                                list, create
/// /admin/categories/create                         create-form payload
/// /admin/categories/{id}                           get, update, delete
/// /admin/categories/{id}/edit                      edit-form payload
///
/// /admin/products                                  list, create
/// /admin/products/create                           create-form payload
/// /admin/products/{id}                             get, update, delete
/// /admin/products/{id}/edit                        edit-form payload
/// /admin/products/{id}/images                      append images (POST)
/// /admin/products/{id}/images/{image_id}           remove image (DELETE)
/// /admin/products/{id}/images/{image_id}/primary   promote to primary (POST)
/// ```
///
/// Every route requires a verified admin session.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin/categories", categories::router())
        .nest("/admin/products", products::router())
}
