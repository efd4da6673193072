use crate::types::DbId;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// One or more submitted form fields failed validation.
    #[error("Validation failed: {0}")]
    Invalid(ValidationErrors),

    /// A deletion was blocked because other live rows still reference the target.
    #[error("Referential conflict: {0}")]
    Referential(ReferentialConflict),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// Why a category could not be deleted.
///
/// Each variant carries its own banner text so callers can show the exact
/// reason without re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialConflict {
    /// At least one product is still a member of the category.
    HasProducts,
    /// At least one category still names this category as its parent.
    HasSubcategories,
}

impl ReferentialConflict {
    /// Stable machine-readable reason.
    pub fn reason(self) -> &'static str {
        match self {
            Self::HasProducts => "has_products",
            Self::HasSubcategories => "has_subcategories",
        }
    }

    /// Human-readable banner message.
    pub fn message(self) -> &'static str {
        match self {
            Self::HasProducts => "Cannot delete category with products.",
            Self::HasSubcategories => "Cannot delete category with subcategories.",
        }
    }
}

impl std::fmt::Display for ReferentialConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referential_messages_are_distinct() {
        assert_ne!(
            ReferentialConflict::HasProducts.message(),
            ReferentialConflict::HasSubcategories.message()
        );
        assert_eq!(ReferentialConflict::HasProducts.reason(), "has_products");
        assert_eq!(
            ReferentialConflict::HasSubcategories.reason(),
            "has_subcategories"
        );
    }

    #[test]
    fn not_found_display() {
        let err = CoreError::NotFound {
            entity: "Product",
            id: 7,
        };
        assert_eq!(err.to_string(), "Entity not found: Product with id 7");
    }
}
