use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{product_images, products};
use crate::state::AppState;

/// Product routes mounted at `/admin/products`.
///
/// ```text
/// GET    /                                -> list_products
/// POST   /                                -> create_product
/// GET    /create                          -> create_form
/// GET    /{id}                            -> get_product
/// PUT    /{id}                            -> update_product
/// DELETE /{id}                            -> delete_product
/// GET    /{id}/edit                       -> edit_form
/// POST   /{id}/images                     -> add_images
/// DELETE /{id}/images/{image_id}          -> remove_image
/// POST   /{id}/images/{image_id}/primary  -> set_primary_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route("/create", get(products::create_form))
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/{id}/edit", get(products::edit_form))
        .route("/{id}/images", post(product_images::add_images))
        .route(
            "/{id}/images/{image_id}",
            delete(product_images::remove_image),
        )
        .route(
            "/{id}/images/{image_id}/primary",
            post(product_images::set_primary_image),
        )
}
