use axum::routing::get;
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Category routes mounted at `/admin/categories`.
///
/// ```text
/// GET    /              -> list_categories
/// POST   /              -> create_category
/// GET    /create        -> create_form
/// GET    /{id}          -> get_category
/// PUT    /{id}          -> update_category
/// DELETE /{id}          -> delete_category
/// GET    /{id}/edit     -> edit_form
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/create", get(categories::create_form))
        .route(
            "/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/{id}/edit", get(categories::edit_form))
}
