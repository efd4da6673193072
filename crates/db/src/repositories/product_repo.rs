//! Repository for the `products` table and `category_product` membership.

use catalog_core::product::ProductInput;
use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{
    Product, ProductCategory, ProductFilter, ProductUpdated, SyncSummary,
};
use crate::models::product_image::ProductImage;
use crate::repositories::ProductImageRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, status, regular_price, compare_at_price, \
                       cost_per_item, stock_quantity, sku, created_at, updated_at";

/// Listing filter shared by the page query and its count. Parameters:
/// `$1` status, `$2` in-stock only, `$3` category id.
const LIST_FILTER: &str = "\
    WHERE ($1::TEXT IS NULL OR p.status = $1) \
      AND (NOT $2 OR p.stock_quantity > 0) \
      AND ($3::BIGINT IS NULL OR EXISTS ( \
          SELECT 1 FROM category_product cp \
          WHERE cp.product_id = p.id AND cp.category_id = $3))";

pub struct ProductRepo;

impl ProductRepo {
    /// Insert a product with its category memberships and image rows in one
    /// transaction. The first image path, if any, becomes the primary image.
    pub async fn create(
        pool: &PgPool,
        input: &ProductInput,
        image_paths: &[String],
    ) -> Result<(Product, Vec<ProductImage>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO products \
                 (title, description, status, regular_price, compare_at_price, \
                  cost_per_item, stock_quantity, sku) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status.name())
            .bind(input.regular_price)
            .bind(input.compare_at_price)
            .bind(input.cost_per_item)
            .bind(input.stock_quantity)
            .bind(&input.sku)
            .fetch_one(&mut *tx)
            .await?;

        Self::sync_categories(&mut tx, product.id, &input.category_ids).await?;
        let images = ProductImageRepo::insert_batch(&mut tx, product.id, image_paths, 0, true).await?;

        tx.commit().await?;
        Ok((product, images))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update every editable column and replace category membership in one
    /// transaction.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ProductInput,
    ) -> Result<Option<ProductUpdated>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE products SET \
                 title = $2, \
                 description = $3, \
                 status = $4, \
                 regular_price = $5, \
                 compare_at_price = $6, \
                 cost_per_item = $7, \
                 stock_quantity = $8, \
                 sku = $9 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status.name())
            .bind(input.regular_price)
            .bind(input.compare_at_price)
            .bind(input.cost_per_item)
            .bind(input.stock_quantity)
            .bind(&input.sku)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(product) = product else {
            return Ok(None);
        };

        let sync = Self::sync_categories(&mut tx, id, &input.category_ids).await?;

        tx.commit().await?;
        Ok(Some(ProductUpdated { product, sync }))
    }

    /// Delete a product. Memberships and image rows cascade.
    ///
    /// Returns the stored paths of the deleted images so the caller can
    /// remove the files after commit, or `None` if the product did not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !Self::lock(&mut tx, id).await? {
            return Ok(None);
        }

        let paths: Vec<String> = sqlx::query_scalar(
            "SELECT image_path FROM product_images WHERE product_id = $1 \
             ORDER BY display_order, id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(paths))
    }

    /// Whether another product already uses `sku`. `exclude_id` skips the
    /// product being edited so an unchanged SKU passes.
    pub async fn sku_taken(
        pool: &PgPool,
        sku: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 FROM products \
                 WHERE sku = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(sku)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// One page of products, newest first, plus the total matching count.
    pub async fn list_page(
        pool: &PgPool,
        filter: &ProductFilter,
    ) -> Result<(Vec<Product>, i64), sqlx::Error> {
        let status = filter.status.map(|s| s.name());

        let query = format!(
            "SELECT {COLUMNS} FROM products p {LIST_FILTER} \
             ORDER BY p.created_at DESC, p.id DESC \
             LIMIT $4 OFFSET $5"
        );
        let products = sqlx::query_as::<_, Product>(&query)
            .bind(status)
            .bind(filter.in_stock_only)
            .bind(filter.category_id)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM products p {LIST_FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(status)
            .bind(filter.in_stock_only)
            .bind(filter.category_id)
            .fetch_one(pool)
            .await?;

        Ok((products, total))
    }

    /// Batch-load category memberships for many products in one query.
    pub async fn categories_for(
        pool: &PgPool,
        product_ids: &[DbId],
    ) -> Result<Vec<ProductCategory>, sqlx::Error> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, ProductCategory>(
            "SELECT cp.product_id, c.id AS category_id, c.name \
             FROM category_product cp \
             JOIN categories c ON c.id = cp.category_id \
             WHERE cp.product_id = ANY($1) \
             ORDER BY c.display_order, c.name, c.id",
        )
        .bind(product_ids)
        .fetch_all(pool)
        .await
    }

    /// Ids of the categories a product belongs to.
    pub async fn category_ids(pool: &PgPool, product_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT category_id FROM category_product WHERE product_id = $1 ORDER BY category_id",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
    }

    /// Make the product's membership exactly `category_ids` within an open
    /// transaction. Rows already in the set are left untouched, so running
    /// the same sync twice changes nothing the second time.
    pub async fn sync_categories(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: DbId,
        category_ids: &[DbId],
    ) -> Result<SyncSummary, sqlx::Error> {
        let detached = sqlx::query(
            "DELETE FROM category_product \
             WHERE product_id = $1 AND NOT (category_id = ANY($2))",
        )
        .bind(product_id)
        .bind(category_ids)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        let attached = sqlx::query(
            "INSERT INTO category_product (category_id, product_id) \
             SELECT category_id, $1 FROM UNNEST($2::BIGINT[]) AS ids (category_id) \
             ON CONFLICT DO NOTHING",
        )
        .bind(product_id)
        .bind(category_ids)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        tracing::debug!(product_id, attached, detached, "Synced product categories");
        Ok(SyncSummary { attached, detached })
    }

    /// Lock a product row for the rest of the transaction. Returns `false`
    /// when the product does not exist.
    pub(crate) async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(locked.is_some())
    }
}
