//! Product writes: validation, cross-record checks, and the transactional
//! repository calls.

use catalog_core::error::CoreError;
use catalog_core::product::{ProductForm, ProductInput};
use catalog_core::types::DbId;
use catalog_core::upload::UploadedFile;
use catalog_core::validation::{FieldErrorCode, ValidationErrors};
use catalog_db::models::product::Product;
use catalog_db::models::product_image::ProductImage;
use catalog_db::repositories::{CategoryRepo, ProductRepo};

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::services::{collect, images, into_valid};
use crate::state::AppState;

pub const SKU_TAKEN_MESSAGE: &str = "The sku has already been taken.";
pub const UNKNOWN_CATEGORIES_MESSAGE: &str = "The selected categories are invalid.";
pub const IMAGES_REQUIRED_MESSAGE: &str = "The images field is required.";

/// Validate and create a product with its initial images.
pub async fn create(
    state: &AppState,
    form: &ProductForm,
    files: Vec<UploadedFile>,
) -> AppResult<Product> {
    let mut errors = ValidationErrors::new();
    let input = collect(form.validate(), &mut errors);
    let accepted = state.uploads.accept_all(&mut errors, "images", files);

    if let Some(input) = &input {
        check_references(state, input, None, &mut errors).await?;
    }
    let input = into_valid(input, errors, "product", "create")?;

    let (product, stored) = images::attach_on_create(state, &input, &accepted).await?;
    tracing::info!(
        product_id = product.id,
        categories = input.category_ids.len(),
        images = stored.len(),
        "Product created",
    );
    Ok(product)
}

/// Validate and update a product, replacing its category membership.
pub async fn update(state: &AppState, id: DbId, form: &ProductForm) -> AppResult<Product> {
    if ProductRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }

    let mut errors = ValidationErrors::new();
    let input = collect(form.validate(), &mut errors);
    if let Some(input) = &input {
        check_references(state, input, Some(id), &mut errors).await?;
    }
    let input = into_valid(input, errors, "product", "update")?;

    let updated = ProductRepo::update(&state.pool, id, &input)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        product_id = id,
        attached = updated.sync.attached,
        detached = updated.sync.detached,
        "Product updated",
    );
    Ok(updated.product)
}

/// Validate uploaded files and append them to an existing product.
pub async fn add_images(
    state: &AppState,
    id: DbId,
    files: Vec<UploadedFile>,
) -> AppResult<Vec<ProductImage>> {
    if ProductRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }

    let mut errors = ValidationErrors::new();
    if files.is_empty() {
        errors.add("images", FieldErrorCode::Required, IMAGES_REQUIRED_MESSAGE);
    }
    let accepted = state.uploads.accept_all(&mut errors, "images", files);
    let accepted = into_valid(Some(accepted), errors, "product_image", "append")?;

    images::append(state, id, &accepted).await
}

/// Delete a product, its memberships, and its images.
pub async fn delete(state: &AppState, id: DbId) -> AppResult<()> {
    let paths = ProductRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(product_id = id, images = paths.len(), "Product deleted");
    images::discard(state.storage.as_ref(), &paths).await;
    Ok(())
}

/// Turn a write failure into the error the caller sees. A SKU that raced
/// past [`ProductRepo::sku_taken`] surfaces as the same field error.
pub fn map_write_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err, "uq_products_sku") {
        return AppError::Core(CoreError::Invalid(ValidationErrors::single(
            "sku",
            FieldErrorCode::Unique,
            SKU_TAKEN_MESSAGE,
        )));
    }
    AppError::Database(err)
}

/// SKU uniqueness and category existence.
async fn check_references(
    state: &AppState,
    input: &ProductInput,
    exclude_id: Option<DbId>,
    errors: &mut ValidationErrors,
) -> AppResult<()> {
    if let Some(sku) = &input.sku {
        if ProductRepo::sku_taken(&state.pool, sku, exclude_id).await? {
            errors.add("sku", FieldErrorCode::Unique, SKU_TAKEN_MESSAGE);
        }
    }

    let existing = CategoryRepo::existing_ids(&state.pool, &input.category_ids).await?;
    if existing.len() != input.category_ids.len() {
        errors.add("categories", FieldErrorCode::Exists, UNKNOWN_CATEGORIES_MESSAGE);
    }
    Ok(())
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Product",
        id,
    })
}
