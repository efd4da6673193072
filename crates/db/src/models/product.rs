//! Product rows, membership rows, and listing filters.

use catalog_core::pricing::PriceSummary;
use catalog_core::product::ProductStatus;
use catalog_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    /// `active` or `draft`; enforced by `ck_products_status`.
    pub status: String,
    pub regular_price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub cost_per_item: Option<Decimal>,
    pub stock_quantity: i32,
    pub sku: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    pub fn status(&self) -> ProductStatus {
        ProductStatus::from_name(&self.status).unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.status() == ProductStatus::Active
    }

    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    pub fn price_summary(&self) -> PriceSummary {
        PriceSummary::compute(self.regular_price, self.compare_at_price, self.cost_per_item)
    }
}

/// One `category_product` membership joined with the category name.
#[derive(Debug, Clone, FromRow)]
pub struct ProductCategory {
    pub product_id: DbId,
    pub category_id: DbId,
    pub name: String,
}

/// Filters and page bounds for the product listing. Bounds are expected to
/// be clamped already.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
    pub in_stock_only: bool,
    pub category_id: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}

/// Membership rows changed by a category sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub attached: u64,
    pub detached: u64,
}

/// Result of a successful product update.
#[derive(Debug, Clone)]
pub struct ProductUpdated {
    pub product: Product,
    pub sync: SyncSummary,
}
