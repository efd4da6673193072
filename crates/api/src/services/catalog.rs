//! Display-ready read models.
//!
//! Related rows for a page (categories, primary images, parents) are loaded
//! with one `= ANY($1)` query each and stitched together in memory, so a
//! listing costs a fixed number of queries regardless of page size.

use std::collections::HashMap;

use catalog_core::error::CoreError;
use catalog_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use catalog_core::pricing::PriceSummary;
use catalog_core::types::DbId;
use catalog_db::models::category::{Category, CategorySummary};
use catalog_db::models::product::{Product, ProductFilter};
use catalog_db::models::product_image::ProductImage;
use catalog_db::repositories::{CategoryRepo, ProductImageRepo, ProductRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::query::ProductListParams;
use crate::response::PageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// One row of the product listing.
#[derive(Debug, Serialize)]
pub struct ProductListItem {
    #[serde(flatten)]
    pub product: Product,
    pub is_active: bool,
    pub in_stock: bool,
    pub categories: Vec<CategorySummary>,
    pub primary_image: Option<ProductImage>,
}

/// A single product with everything the detail page shows.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub is_active: bool,
    pub in_stock: bool,
    pub pricing: PriceSummary,
    pub categories: Vec<CategorySummary>,
    pub images: Vec<ProductImage>,
    pub primary_image: Option<ProductImage>,
}

/// Choices for the product create form.
#[derive(Debug, Serialize)]
pub struct ProductFormOptions {
    pub categories: Vec<Category>,
}

/// A product with its edit form choices and current selection.
#[derive(Debug, Serialize)]
pub struct ProductEditForm {
    pub product: ProductDetail,
    pub categories: Vec<Category>,
    pub selected_categories: Vec<DbId>,
}

/// A category with its parent resolved.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    #[serde(flatten)]
    pub category: Category,
    pub is_main_category: bool,
    pub parent: Option<CategorySummary>,
}

#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub view: CategoryView,
    pub children: Vec<Category>,
    pub product_count: i64,
}

/// Parent choices for the category forms. Only top-level categories are offered.
#[derive(Debug, Serialize)]
pub struct CategoryFormOptions {
    pub parents: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct CategoryEditForm {
    pub category: Category,
    pub parents: Vec<Category>,
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// One page of products, newest first.
pub async fn list_products(
    state: &AppState,
    params: ProductListParams,
) -> AppResult<PageResponse<ProductListItem>> {
    let filter = ProductFilter {
        status: params.status,
        in_stock_only: params.in_stock,
        category_id: params.category_id,
        limit: clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        offset: clamp_offset(params.offset),
    };
    let (products, total) = ProductRepo::list_page(&state.pool, &filter).await?;

    let ids: Vec<DbId> = products.iter().map(|p| p.id).collect();
    let mut categories = categories_by_product(state, &ids).await?;
    let mut primaries: HashMap<DbId, ProductImage> =
        ProductImageRepo::primary_for(&state.pool, &ids)
            .await?
            .into_iter()
            .map(|image| (image.product_id, image))
            .collect();

    let data = products
        .into_iter()
        .map(|product| ProductListItem {
            is_active: product.is_active(),
            in_stock: product.in_stock(),
            categories: categories.remove(&product.id).unwrap_or_default(),
            primary_image: primaries.remove(&product.id),
            product,
        })
        .collect();

    Ok(PageResponse {
        data,
        total,
        limit: filter.limit,
        offset: filter.offset,
    })
}

pub async fn product_detail(state: &AppState, id: DbId) -> AppResult<ProductDetail> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        }))?;

    let categories = categories_by_product(state, &[id])
        .await?
        .remove(&id)
        .unwrap_or_default();
    let images = ProductImageRepo::list_by_product(&state.pool, id).await?;
    let primary_image = images.iter().find(|image| image.is_primary).cloned();

    Ok(ProductDetail {
        is_active: product.is_active(),
        in_stock: product.in_stock(),
        pricing: product.price_summary(),
        categories,
        images,
        primary_image,
        product,
    })
}

pub async fn product_create_form(state: &AppState) -> AppResult<ProductFormOptions> {
    let categories = CategoryRepo::list_ordered(&state.pool).await?;
    Ok(ProductFormOptions { categories })
}

pub async fn product_edit_form(state: &AppState, id: DbId) -> AppResult<ProductEditForm> {
    let product = product_detail(state, id).await?;
    let categories = CategoryRepo::list_ordered(&state.pool).await?;
    let selected_categories = ProductRepo::category_ids(&state.pool, id).await?;
    Ok(ProductEditForm {
        product,
        categories,
        selected_categories,
    })
}

async fn categories_by_product(
    state: &AppState,
    product_ids: &[DbId],
) -> AppResult<HashMap<DbId, Vec<CategorySummary>>> {
    let mut grouped: HashMap<DbId, Vec<CategorySummary>> = HashMap::new();
    for row in ProductRepo::categories_for(&state.pool, product_ids).await? {
        grouped.entry(row.product_id).or_default().push(CategorySummary {
            id: row.category_id,
            name: row.name,
        });
    }
    Ok(grouped)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Every category ordered by display order then name, parents resolved.
pub async fn list_categories(state: &AppState) -> AppResult<Vec<CategoryView>> {
    let categories = CategoryRepo::list_ordered(&state.pool).await?;

    let mut parent_ids: Vec<DbId> = categories.iter().filter_map(|c| c.parent_id).collect();
    parent_ids.sort_unstable();
    parent_ids.dedup();
    let parents: HashMap<DbId, CategorySummary> = CategoryRepo::summaries(&state.pool, &parent_ids)
        .await?
        .into_iter()
        .map(|summary| (summary.id, summary))
        .collect();

    Ok(categories
        .into_iter()
        .map(|category| {
            let parent = category.parent_id.and_then(|id| parents.get(&id).cloned());
            CategoryView {
                is_main_category: category.is_main_category(),
                parent,
                category,
            }
        })
        .collect())
}

pub async fn category_detail(state: &AppState, id: DbId) -> AppResult<CategoryDetail> {
    let category = find_category(state, id).await?;

    let parent = match category.parent_id {
        Some(parent_id) => CategoryRepo::summaries(&state.pool, &[parent_id])
            .await?
            .into_iter()
            .next(),
        None => None,
    };
    let children = CategoryRepo::children(&state.pool, id).await?;
    let product_count = CategoryRepo::product_count(&state.pool, id).await?;

    Ok(CategoryDetail {
        view: CategoryView {
            is_main_category: category.is_main_category(),
            parent,
            category,
        },
        children,
        product_count,
    })
}

pub async fn category_create_form(state: &AppState) -> AppResult<CategoryFormOptions> {
    let parents = CategoryRepo::top_level(&state.pool, None).await?;
    Ok(CategoryFormOptions { parents })
}

/// The category itself is never offered as its own parent.
pub async fn category_edit_form(state: &AppState, id: DbId) -> AppResult<CategoryEditForm> {
    let category = find_category(state, id).await?;
    let parents = CategoryRepo::top_level(&state.pool, Some(id)).await?;
    Ok(CategoryEditForm { category, parents })
}

async fn find_category(state: &AppState, id: DbId) -> AppResult<Category> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))
}
