//! Request-level orchestration between validation, repositories, and file
//! storage. Handlers stay thin and call into these modules.
//!
//! - [`images`] -- file/row ordering for product and category images.
//! - [`products`] -- product create, update, delete.
//! - [`categories`] -- category create, update, guarded delete.
//! - [`catalog`] -- display-ready read models with batch loading.

pub mod catalog;
pub mod categories;
pub mod images;
pub mod products;

use catalog_core::error::CoreError;
use catalog_core::validation::ValidationErrors;

use crate::error::{AppError, AppResult};

/// Fold a form's validation result into an accumulating error set.
pub(crate) fn collect<T>(
    result: Result<T, ValidationErrors>,
    errors: &mut ValidationErrors,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.merge(e);
            None
        }
    }
}

/// The validated value, or every accumulated field error.
pub(crate) fn into_valid<T>(
    value: Option<T>,
    errors: ValidationErrors,
    entity: &str,
    action: &str,
) -> AppResult<T> {
    match value {
        Some(value) if errors.is_empty() => Ok(value),
        _ => {
            tracing::info!(entity, action, fields = %errors, "Validation failed");
            Err(AppError::Core(CoreError::Invalid(errors)))
        }
    }
}
