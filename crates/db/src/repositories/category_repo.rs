//! Repository for the `categories` table.

use catalog_core::category::CategoryInput;
use catalog_core::error::ReferentialConflict;
use catalog_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::category::{
    Category, CategoryDeleteOutcome, CategorySummary, CategoryUpdateOutcome, CategoryUpdated,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, display_order, parent_id, is_promotional, \
                       image_path, created_at, updated_at";

/// Ordering used by every category listing.
const ORDER: &str = "ORDER BY display_order, name, id";

/// Transaction-scoped advisory lock key held while a category is given a
/// parent. Re-parentings run one at a time so two of them cannot each pass
/// the ancestry check and together close a loop.
const TREE_LOCK_KEY: i64 = 0x6361_7465_676f_7279;

pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CategoryInput,
        image_path: Option<&str>,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories \
                 (name, description, display_order, parent_id, is_promotional, image_path) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.display_order)
            .bind(input.parent_id)
            .bind(input.is_promotional)
            .bind(image_path)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All categories by display order, then name.
    pub async fn list_ordered(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories {ORDER}");
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    /// Categories without a parent, optionally leaving one out (the category
    /// being edited, so it is never offered as its own parent).
    pub async fn top_level(
        pool: &PgPool,
        exclude: Option<DbId>,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories \
             WHERE parent_id IS NULL AND ($1::BIGINT IS NULL OR id <> $1) \
             {ORDER}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(exclude)
            .fetch_all(pool)
            .await
    }

    /// Direct children of a category.
    pub async fn children(pool: &PgPool, id: DbId) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE parent_id = $1 {ORDER}");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_all(pool)
            .await
    }

    /// Batch-load id/name pairs for the given ids.
    pub async fn summaries(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<CategorySummary>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, CategorySummary>(
            "SELECT id, name FROM categories WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// The subset of `ids` that exist.
    pub async fn existing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, DbId>("SELECT id FROM categories WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Whether `ancestor_id` appears on the parent chain of `descendant_id`.
    ///
    /// A category counts as its own ancestor, so this answers "would making
    /// `ancestor_id` a child of `descendant_id` close a loop".
    pub async fn is_ancestor_of<'e>(
        executor: impl PgExecutor<'e>,
        ancestor_id: DbId,
        descendant_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "WITH RECURSIVE chain (id, parent_id) AS ( \
                 SELECT id, parent_id FROM categories WHERE id = $2 \
                 UNION \
                 SELECT c.id, c.parent_id FROM categories c \
                 JOIN chain ON c.id = chain.parent_id \
             ) \
             SELECT EXISTS (SELECT 1 FROM chain WHERE id = $1)",
        )
        .bind(ancestor_id)
        .bind(descendant_id)
        .fetch_one(executor)
        .await
    }

    /// Number of products that list this category.
    pub async fn product_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM category_product WHERE category_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Update a category. `new_image` replaces the stored image path when
    /// present; otherwise the current image is kept.
    ///
    /// When a parent is set, the ancestry check and the write happen under
    /// the tree lock in one transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &CategoryInput,
        new_image: Option<&str>,
    ) -> Result<CategoryUpdateOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if input.parent_id.is_some() {
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(TREE_LOCK_KEY)
                .execute(&mut *tx)
                .await?;
        }

        let current: Option<Option<String>> = sqlx::query_scalar(
            "SELECT image_path FROM categories WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(previous_image) = current else {
            return Ok(CategoryUpdateOutcome::NotFound);
        };

        if let Some(parent_id) = input.parent_id {
            if Self::is_ancestor_of(&mut *tx, id, parent_id).await? {
                return Ok(CategoryUpdateOutcome::ParentCycle);
            }
        }

        let query = format!(
            "UPDATE categories SET \
                 name = $2, \
                 description = $3, \
                 display_order = $4, \
                 parent_id = $5, \
                 is_promotional = $6, \
                 image_path = COALESCE($7, image_path) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.display_order)
            .bind(input.parent_id)
            .bind(input.is_promotional)
            .bind(new_image)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let replaced_image = match new_image {
            Some(_) => previous_image,
            None => None,
        };
        Ok(CategoryUpdateOutcome::Updated(CategoryUpdated {
            category,
            replaced_image,
        }))
    }

    /// Delete a category only when no product and no child category
    /// references it. Products are checked first.
    ///
    /// The row is locked for the duration of the check so a concurrent
    /// membership insert cannot slip in between count and delete; the
    /// `ON DELETE RESTRICT` foreign keys back this up.
    pub async fn delete_guarded(
        pool: &PgPool,
        id: DbId,
    ) -> Result<CategoryDeleteOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(CategoryDeleteOutcome::NotFound);
        }

        let products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM category_product WHERE category_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if products > 0 {
            return Ok(CategoryDeleteOutcome::Blocked(ReferentialConflict::HasProducts));
        }

        let children: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if children > 0 {
            return Ok(CategoryDeleteOutcome::Blocked(
                ReferentialConflict::HasSubcategories,
            ));
        }

        let query = format!("DELETE FROM categories WHERE id = $1 RETURNING {COLUMNS}");
        let deleted = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CategoryDeleteOutcome::Deleted(deleted))
    }
}
