//! Image management.
//!
//! Files are written before the rows that reference them and removed only
//! after the rows are gone, so a crash can orphan a file but never leave a
//! row pointing at a missing one. Batch writes are all-or-nothing: when any
//! file or the row transaction fails, the files already stored for that
//! request are removed again.

use catalog_core::category::CategoryInput;
use catalog_core::error::CoreError;
use catalog_core::product::ProductInput;
use catalog_core::storage::{FileStorage, StorageError, CATEGORIES_DIR, PRODUCTS_DIR};
use catalog_core::types::DbId;
use catalog_core::upload::AcceptedImage;
use catalog_core::validation::{FieldErrorCode, ValidationErrors};
use catalog_db::models::category::{Category, CategoryUpdateOutcome};
use catalog_db::models::product::Product;
use catalog_db::models::product_image::{ProductImage, RemovedImage};
use catalog_db::repositories::{CategoryRepo, ProductImageRepo, ProductRepo};

use crate::error::{AppError, AppResult};
use crate::services::categories::DESCENDANT_PARENT_MESSAGE;
use crate::services::products::map_write_error;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Storage helpers
// ---------------------------------------------------------------------------

/// Store every image under `dir`, or none of them.
pub async fn store_batch(
    storage: &dyn FileStorage,
    dir: &str,
    images: &[AcceptedImage],
) -> Result<Vec<String>, StorageError> {
    let mut stored = Vec::with_capacity(images.len());
    for image in images {
        match storage.put(&image.bytes, dir, image.kind.extension()).await {
            Ok(path) => {
                tracing::info!(
                    path = %path,
                    original_name = ?image.original_name,
                    size = image.bytes.len(),
                    "Image stored",
                );
                stored.push(path);
            }
            Err(e) => {
                tracing::error!(error = %e, stored = stored.len(), "Image store failed");
                discard(storage, &stored).await;
                return Err(e);
            }
        }
    }
    Ok(stored)
}

/// Remove stored files. Failures are logged and otherwise ignored.
pub async fn discard(storage: &dyn FileStorage, paths: &[String]) {
    for path in paths {
        match storage.delete(path).await {
            Ok(()) => tracing::debug!(path = %path, "Stored image removed"),
            Err(e) => tracing::warn!(path = %path, error = %e, "Failed to remove stored image"),
        }
    }
}

fn image_not_found(image_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ProductImage",
        id: image_id,
    })
}

fn product_not_found(product_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Product",
        id: product_id,
    })
}

// ---------------------------------------------------------------------------
// Product images
// ---------------------------------------------------------------------------

/// Create a product together with its initial images. The first image
/// becomes primary.
pub async fn attach_on_create(
    state: &AppState,
    input: &ProductInput,
    images: &[AcceptedImage],
) -> AppResult<(Product, Vec<ProductImage>)> {
    let storage = state.storage.as_ref();
    let paths = store_batch(storage, PRODUCTS_DIR, images).await?;

    match ProductRepo::create(&state.pool, input, &paths).await {
        Ok(created) => Ok(created),
        Err(e) => {
            tracing::error!(error = %e, "Product transaction failed, removing stored images");
            discard(storage, &paths).await;
            Err(map_write_error(e))
        }
    }
}

/// Append images after the product's existing ones. Appended images are
/// never primary.
pub async fn append(
    state: &AppState,
    product_id: DbId,
    images: &[AcceptedImage],
) -> AppResult<Vec<ProductImage>> {
    if ProductRepo::find_by_id(&state.pool, product_id).await?.is_none() {
        return Err(product_not_found(product_id));
    }

    let storage = state.storage.as_ref();
    let paths = store_batch(storage, PRODUCTS_DIR, images).await?;

    match ProductImageRepo::append(&state.pool, product_id, &paths).await {
        Ok(Some(appended)) => {
            tracing::info!(product_id, count = appended.len(), "Images appended");
            Ok(appended)
        }
        Ok(None) => {
            discard(storage, &paths).await;
            Err(product_not_found(product_id))
        }
        Err(e) => {
            discard(storage, &paths).await;
            Err(e.into())
        }
    }
}

/// Delete one image of a product, promoting a replacement primary when
/// needed, then remove its file.
pub async fn remove(state: &AppState, product_id: DbId, image_id: DbId) -> AppResult<RemovedImage> {
    if ProductRepo::find_by_id(&state.pool, product_id).await?.is_none() {
        return Err(product_not_found(product_id));
    }

    let removed = ProductImageRepo::remove(&state.pool, product_id, image_id)
        .await?
        .ok_or_else(|| image_not_found(image_id))?;

    tracing::info!(
        product_id,
        image_id,
        was_primary = removed.removed.is_primary,
        promoted_id = removed.promoted.as_ref().map(|i| i.id),
        "Image removed",
    );

    discard(state.storage.as_ref(), &[removed.removed.image_path.clone()]).await;
    Ok(removed)
}

/// Make one image the product's primary image.
pub async fn set_primary(
    state: &AppState,
    product_id: DbId,
    image_id: DbId,
) -> AppResult<ProductImage> {
    if ProductRepo::find_by_id(&state.pool, product_id).await?.is_none() {
        return Err(product_not_found(product_id));
    }

    let image = ProductImageRepo::set_primary(&state.pool, product_id, image_id)
        .await?
        .ok_or_else(|| image_not_found(image_id))?;

    tracing::info!(product_id, image_id, "Primary image updated");
    Ok(image)
}

// ---------------------------------------------------------------------------
// Category images
// ---------------------------------------------------------------------------

async fn store_one(state: &AppState, image: Option<&AcceptedImage>) -> AppResult<Option<String>> {
    match image {
        Some(image) => {
            let mut paths =
                store_batch(state.storage.as_ref(), CATEGORIES_DIR, std::slice::from_ref(image))
                    .await?;
            Ok(paths.pop())
        }
        None => Ok(None),
    }
}

/// Create a category with an optional image.
pub async fn create_category(
    state: &AppState,
    input: &CategoryInput,
    image: Option<&AcceptedImage>,
) -> AppResult<Category> {
    let path = store_one(state, image).await?;

    match CategoryRepo::create(&state.pool, input, path.as_deref()).await {
        Ok(category) => Ok(category),
        Err(e) => {
            discard(state.storage.as_ref(), path.as_slice()).await;
            Err(e.into())
        }
    }
}

/// Update a category, replacing its image when a new one is supplied. The
/// previous file is removed only after the row points at the new one.
///
/// Returns `None` if the category does not exist. A parent that became a
/// descendant after validation ran is reported on `parent_id`.
pub async fn update_category(
    state: &AppState,
    id: DbId,
    input: &CategoryInput,
    image: Option<&AcceptedImage>,
) -> AppResult<Option<Category>> {
    let storage = state.storage.as_ref();
    let path = store_one(state, image).await?;

    match CategoryRepo::update(&state.pool, id, input, path.as_deref()).await {
        Ok(CategoryUpdateOutcome::Updated(updated)) => {
            if let Some(previous) = updated.replaced_image {
                tracing::info!(category_id = id, previous = %previous, "Category image replaced");
                discard(storage, &[previous]).await;
            }
            Ok(Some(updated.category))
        }
        Ok(CategoryUpdateOutcome::NotFound) => {
            discard(storage, path.as_slice()).await;
            Ok(None)
        }
        Ok(CategoryUpdateOutcome::ParentCycle) => {
            tracing::info!(
                category_id = id,
                parent_id = input.parent_id,
                "Category update would close a cycle",
            );
            discard(storage, path.as_slice()).await;
            Err(AppError::Core(CoreError::Invalid(ValidationErrors::single(
                "parent_id",
                FieldErrorCode::Cycle,
                DESCENDANT_PARENT_MESSAGE,
            ))))
        }
        Err(e) => {
            discard(storage, path.as_slice()).await;
            Err(e.into())
        }
    }
}
