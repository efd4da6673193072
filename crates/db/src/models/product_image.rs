use catalog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `product_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductImage {
    pub id: DbId,
    pub product_id: DbId,
    pub image_path: String,
    pub display_order: i32,
    pub is_primary: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of removing one image from a product.
#[derive(Debug, Clone, Serialize)]
pub struct RemovedImage {
    pub removed: ProductImage,
    /// The image promoted to primary because the removed one held the flag.
    pub promoted: Option<ProductImage>,
}
