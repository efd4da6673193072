//! Category form validation.

use crate::types::DbId;
use crate::validation::{
    optional_bool, optional_text, parse_id, required_non_negative_int, required_text,
    FieldErrorCode, ValidationErrors, MAX_SHORT_TEXT,
};

/// Form value the parent selector submits for "no parent".
pub const NO_PARENT_SENTINEL: &str = "none";

/// Raw category form as submitted.
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<String>,
    pub parent_id: Option<String>,
    pub is_promotional: Option<String>,
}

/// A category form that passed field validation.
///
/// Parent existence and ancestry are checked against the database separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub parent_id: Option<DbId>,
    pub is_promotional: bool,
}

impl CategoryForm {
    /// Validate the form. `editing` is the id of the category being updated,
    /// used to reject a category naming itself as parent.
    pub fn validate(&self, editing: Option<DbId>) -> Result<CategoryInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = required_text(&mut errors, "name", self.name.as_deref(), MAX_SHORT_TEXT);
        let description = optional_text(self.description.as_deref());
        let display_order =
            required_non_negative_int(&mut errors, "display_order", self.display_order.as_deref());
        let parent_id = normalize_parent(&mut errors, self.parent_id.as_deref());
        let is_promotional =
            optional_bool(&mut errors, "is_promotional", self.is_promotional.as_deref());

        if let (Some(parent), Some(id)) = (parent_id, editing) {
            if parent == id {
                errors.add(
                    "parent_id",
                    FieldErrorCode::Cycle,
                    "A category cannot be its own parent.",
                );
            }
        }

        match (name, display_order) {
            (Some(name), Some(display_order)) if errors.is_empty() => Ok(CategoryInput {
                name,
                description,
                display_order,
                parent_id,
                is_promotional,
            }),
            _ => Err(errors),
        }
    }
}

/// Blank input and the `"none"` sentinel both mean "no parent".
pub fn normalize_parent(errors: &mut ValidationErrors, value: Option<&str>) -> Option<DbId> {
    let raw = optional_text(value)?;
    if raw.eq_ignore_ascii_case(NO_PARENT_SENTINEL) {
        return None;
    }
    parse_id(errors, "parent_id", &raw)
}
