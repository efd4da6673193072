//! Repository for the `product_images` table.
//!
//! Every write that touches the primary flag locks the owning product row
//! first, so concurrent promotions and removals on one product serialize.
//! The partial unique index `uq_product_images_primary` rejects any
//! interleaving that would still leave two primaries.

use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::product_image::{ProductImage, RemovedImage};
use crate::repositories::ProductRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, product_id, image_path, display_order, is_primary, created_at, updated_at";

pub struct ProductImageRepo;

impl ProductImageRepo {
    /// All images of a product in display order.
    pub async fn list_by_product(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<ProductImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_images \
             WHERE product_id = $1 \
             ORDER BY display_order, id"
        );
        sqlx::query_as::<_, ProductImage>(&query)
            .bind(product_id)
            .fetch_all(pool)
            .await
    }

    /// Batch-load the primary image of each listed product.
    pub async fn primary_for(
        pool: &PgPool,
        product_ids: &[DbId],
    ) -> Result<Vec<ProductImage>, sqlx::Error> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM product_images \
             WHERE product_id = ANY($1) AND is_primary"
        );
        sqlx::query_as::<_, ProductImage>(&query)
            .bind(product_ids)
            .fetch_all(pool)
            .await
    }

    /// Append images after the product's current highest display order.
    /// Appended images are never primary.
    ///
    /// Returns `None` if the product does not exist.
    pub async fn append(
        pool: &PgPool,
        product_id: DbId,
        image_paths: &[String],
    ) -> Result<Option<Vec<ProductImage>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !ProductRepo::lock(&mut tx, product_id).await? {
            return Ok(None);
        }

        let max_order: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(display_order), -1) FROM product_images WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        let images =
            Self::insert_batch(&mut tx, product_id, image_paths, max_order + 1, false).await?;

        tx.commit().await?;
        Ok(Some(images))
    }

    /// Make `image_id` the product's only primary image.
    ///
    /// Returns `None` when the product does not exist or the image belongs to
    /// a different product; nothing is changed in that case.
    pub async fn set_primary(
        pool: &PgPool,
        product_id: DbId,
        image_id: DbId,
    ) -> Result<Option<ProductImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !ProductRepo::lock(&mut tx, product_id).await? {
            return Ok(None);
        }

        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM product_images WHERE id = $1 AND product_id = $2)",
        )
        .bind(image_id)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;
        if !owned {
            return Ok(None);
        }

        // Clear before set: the partial unique index is checked per row.
        sqlx::query(
            "UPDATE product_images SET is_primary = FALSE \
             WHERE product_id = $1 AND is_primary AND id <> $2",
        )
        .bind(product_id)
        .bind(image_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE product_images SET is_primary = TRUE \
             WHERE id = $1 AND product_id = $2 \
             RETURNING {COLUMNS}"
        );
        let image = sqlx::query_as::<_, ProductImage>(&query)
            .bind(image_id)
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(image))
    }

    /// Delete one image of a product. When it was the primary, the remaining
    /// image with the lowest display order (then lowest id) is promoted.
    ///
    /// Returns `None` if the product has no image with that id.
    pub async fn remove(
        pool: &PgPool,
        product_id: DbId,
        image_id: DbId,
    ) -> Result<Option<RemovedImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !ProductRepo::lock(&mut tx, product_id).await? {
            return Ok(None);
        }

        let query = format!(
            "DELETE FROM product_images \
             WHERE id = $1 AND product_id = $2 \
             RETURNING {COLUMNS}"
        );
        let removed = sqlx::query_as::<_, ProductImage>(&query)
            .bind(image_id)
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(removed) = removed else {
            return Ok(None);
        };

        let promoted = if removed.is_primary {
            let query = format!(
                "UPDATE product_images SET is_primary = TRUE \
                 WHERE id = ( \
                     SELECT id FROM product_images \
                     WHERE product_id = $1 \
                     ORDER BY display_order, id \
                     LIMIT 1) \
                 RETURNING {COLUMNS}"
            );
            sqlx::query_as::<_, ProductImage>(&query)
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?
        } else {
            None
        };

        tx.commit().await?;
        Ok(Some(RemovedImage { removed, promoted }))
    }

    /// Insert image rows with consecutive display orders starting at
    /// `start_order`. Only the first row is flagged primary, and only when
    /// `first_is_primary` is set.
    pub(crate) async fn insert_batch(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: DbId,
        image_paths: &[String],
        start_order: i32,
        first_is_primary: bool,
    ) -> Result<Vec<ProductImage>, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_images (product_id, image_path, display_order, is_primary) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );

        let mut images = Vec::with_capacity(image_paths.len());
        for (position, path) in (0_i32..).zip(image_paths) {
            let image = sqlx::query_as::<_, ProductImage>(&query)
                .bind(product_id)
                .bind(path)
                .bind(start_order + position)
                .bind(first_is_primary && position == 0)
                .fetch_one(&mut **tx)
                .await?;
            images.push(image);
        }
        Ok(images)
    }
}
