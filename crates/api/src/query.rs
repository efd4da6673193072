//! Query parameter types for listing endpoints.

use catalog_core::product::ProductStatus;
use catalog_core::types::DbId;
use serde::Deserialize;

/// `GET /admin/products?limit=&offset=&status=&in_stock=&category_id=`
///
/// Page bounds are clamped by the catalog service.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub in_stock: bool,
    pub category_id: Option<DbId>,
}
