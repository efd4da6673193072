//! Category writes: validation, parent checks, and the guarded delete.

use catalog_core::category::{CategoryForm, CategoryInput};
use catalog_core::error::CoreError;
use catalog_core::types::DbId;
use catalog_core::upload::UploadedFile;
use catalog_core::validation::{FieldErrorCode, ValidationErrors};
use catalog_db::models::category::{Category, CategoryDeleteOutcome};
use catalog_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::services::{collect, images, into_valid};
use crate::state::AppState;

pub const UNKNOWN_PARENT_MESSAGE: &str = "The selected parent id is invalid.";
pub const DESCENDANT_PARENT_MESSAGE: &str =
    "A category cannot be placed beneath one of its own subcategories.";

/// Validate and create a category with an optional image.
pub async fn create(
    state: &AppState,
    form: &CategoryForm,
    file: Option<UploadedFile>,
) -> AppResult<Category> {
    let mut errors = ValidationErrors::new();
    let input = collect(form.validate(None), &mut errors);
    let image = state.uploads.accept_one(&mut errors, "image", file);

    if let Some(input) = &input {
        check_parent(state, input, None, &mut errors).await?;
    }
    let input = into_valid(input, errors, "category", "create")?;

    let category = images::create_category(state, &input, image.as_ref()).await?;
    tracing::info!(
        category_id = category.id,
        parent_id = category.parent_id,
        has_image = category.image_path.is_some(),
        "Category created",
    );
    Ok(category)
}

/// Validate and update a category. A supplied image replaces the current one.
pub async fn update(
    state: &AppState,
    id: DbId,
    form: &CategoryForm,
    file: Option<UploadedFile>,
) -> AppResult<Category> {
    if !CategoryRepo::exists(&state.pool, id).await? {
        return Err(not_found(id));
    }

    let mut errors = ValidationErrors::new();
    let input = collect(form.validate(Some(id)), &mut errors);
    let image = state.uploads.accept_one(&mut errors, "image", file);

    if let Some(input) = &input {
        check_parent(state, input, Some(id), &mut errors).await?;
    }
    let input = into_valid(input, errors, "category", "update")?;

    let category = images::update_category(state, id, &input, image.as_ref())
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(category_id = id, parent_id = category.parent_id, "Category updated");
    Ok(category)
}

/// Delete a category that no product and no subcategory references, then
/// remove its image.
pub async fn delete(state: &AppState, id: DbId) -> AppResult<Category> {
    match CategoryRepo::delete_guarded(&state.pool, id).await? {
        CategoryDeleteOutcome::Deleted(category) => {
            tracing::info!(category_id = id, "Category deleted");
            if let Some(path) = &category.image_path {
                images::discard(state.storage.as_ref(), std::slice::from_ref(path)).await;
            }
            Ok(category)
        }
        CategoryDeleteOutcome::Blocked(conflict) => {
            tracing::info!(category_id = id, reason = conflict.reason(), "Category delete blocked");
            Err(AppError::Core(CoreError::Referential(conflict)))
        }
        CategoryDeleteOutcome::NotFound => Err(not_found(id)),
    }
}

/// The parent must exist and, when editing, must not sit beneath the
/// category being edited.
async fn check_parent(
    state: &AppState,
    input: &CategoryInput,
    editing: Option<DbId>,
    errors: &mut ValidationErrors,
) -> AppResult<()> {
    let Some(parent_id) = input.parent_id else {
        return Ok(());
    };

    if !CategoryRepo::exists(&state.pool, parent_id).await? {
        errors.add("parent_id", FieldErrorCode::Exists, UNKNOWN_PARENT_MESSAGE);
        return Ok(());
    }

    if let Some(id) = editing.filter(|id| *id != parent_id) {
        if CategoryRepo::is_ancestor_of(&state.pool, id, parent_id).await? {
            errors.add("parent_id", FieldErrorCode::Cycle, DESCENDANT_PARENT_MESSAGE);
        }
    }
    Ok(())
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}
