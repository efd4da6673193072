//! Category rows and delete outcomes.

use catalog_core::error::ReferentialConflict;
use catalog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub parent_id: Option<DbId>,
    pub is_promotional: bool,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Category {
    /// Top-level categories have no parent.
    pub fn is_main_category(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Id and name only, used for parent links and product membership lists.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CategorySummary {
    pub id: DbId,
    pub name: String,
}

/// Result of a successful category update.
#[derive(Debug, Clone)]
pub struct CategoryUpdated {
    pub category: Category,
    /// Stored path of the image that the update replaced, if any.
    pub replaced_image: Option<String>,
}

/// Result of a category update.
#[derive(Debug, Clone)]
pub enum CategoryUpdateOutcome {
    Updated(CategoryUpdated),
    NotFound,
    /// The new parent sits beneath the category being updated.
    ParentCycle,
}

/// Result of a guarded category delete.
#[derive(Debug, Clone)]
pub enum CategoryDeleteOutcome {
    Deleted(Category),
    NotFound,
    Blocked(ReferentialConflict),
}
