//! Product status and product form validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pricing::check_price_order;
use crate::types::DbId;
use crate::validation::{
    optional_bounded_text, optional_money, optional_text, parse_id, required_money,
    required_non_negative_int, required_text, FieldErrorCode, ValidationErrors, MAX_SHORT_TEXT,
};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Product publication status. Either value may be set directly by any update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    #[default]
    Draft,
}

impl ProductStatus {
    /// Parse from the database `status` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "active" => Ok(Self::Active),
            "draft" => Ok(Self::Draft),
            other => Err(CoreError::Validation(format!(
                "Unknown product status '{other}'"
            ))),
        }
    }

    /// Database name value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Draft => "draft",
        }
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Raw product form as submitted, every value still a string.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub regular_price: Option<String>,
    pub compare_at_price: Option<String>,
    pub cost_per_item: Option<String>,
    pub stock_quantity: Option<String>,
    pub sku: Option<String>,
    pub categories: Vec<String>,
}

/// A product form that passed field validation.
///
/// Cross-record checks (SKU uniqueness, category existence) still run in the
/// database layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub title: String,
    pub description: Option<String>,
    pub status: ProductStatus,
    pub regular_price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub cost_per_item: Option<Decimal>,
    pub stock_quantity: i32,
    /// Blank SKUs are normalized to `None`.
    pub sku: Option<String>,
    /// Distinct category ids in submission order.
    pub category_ids: Vec<DbId>,
}

impl ProductForm {
    pub fn validate(&self) -> Result<ProductInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = required_text(&mut errors, "title", self.title.as_deref(), MAX_SHORT_TEXT);
        let description = optional_text(self.description.as_deref());
        let status = parse_status(&mut errors, self.status.as_deref());
        let regular_price = required_money(&mut errors, "regular_price", self.regular_price.as_deref());
        let compare_at_price =
            optional_money(&mut errors, "compare_at_price", self.compare_at_price.as_deref());
        let cost_per_item = optional_money(&mut errors, "cost_per_item", self.cost_per_item.as_deref());
        let stock_quantity =
            required_non_negative_int(&mut errors, "stock_quantity", self.stock_quantity.as_deref());
        let sku = optional_bounded_text(&mut errors, "sku", self.sku.as_deref(), MAX_SHORT_TEXT);
        let category_ids = parse_category_ids(&mut errors, &self.categories);

        if let Some(regular_price) = regular_price {
            check_price_order(&mut errors, regular_price, compare_at_price);
        }

        match (title, status, regular_price, stock_quantity) {
            (Some(title), Some(status), Some(regular_price), Some(stock_quantity))
                if errors.is_empty() =>
            {
                Ok(ProductInput {
                    title,
                    description,
                    status,
                    regular_price,
                    compare_at_price,
                    cost_per_item,
                    stock_quantity,
                    sku,
                    category_ids,
                })
            }
            _ => Err(errors),
        }
    }
}

fn parse_status(errors: &mut ValidationErrors, value: Option<&str>) -> Option<ProductStatus> {
    let Some(raw) = optional_text(value) else {
        errors.add("status", FieldErrorCode::Required, "The status field is required.");
        return None;
    };
    match ProductStatus::from_name(&raw) {
        Ok(status) => Some(status),
        Err(_) => {
            errors.add("status", FieldErrorCode::Invalid, "The selected status is invalid.");
            None
        }
    }
}

/// At least one category is required; duplicates collapse to one.
fn parse_category_ids(errors: &mut ValidationErrors, raw: &[String]) -> Vec<DbId> {
    let mut ids: Vec<DbId> = Vec::with_capacity(raw.len());
    for value in raw.iter().filter(|v| !v.trim().is_empty()) {
        if let Some(id) = parse_id(errors, "categories", value) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    if ids.is_empty() && !errors.has("categories") {
        errors.add(
            "categories",
            FieldErrorCode::Required,
            "The categories field must have at least 1 item.",
        );
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm {
            title: Some("Dune".into()),
            description: Some("".into()),
            status: Some("active".into()),
            regular_price: Some("1000".into()),
            compare_at_price: None,
            cost_per_item: Some("600".into()),
            stock_quantity: Some("4".into()),
            sku: Some("ISBN-1".into()),
            categories: vec!["3".into(), "5".into()],
        }
    }

    #[test]
    fn status_round_trip_names() {
        assert_eq!(ProductStatus::from_name("active").unwrap(), ProductStatus::Active);
        assert_eq!(ProductStatus::from_name("draft").unwrap(), ProductStatus::Draft);
        assert!(ProductStatus::from_name("archived").is_err());
        assert_eq!(ProductStatus::Active.name(), "active");
        assert_eq!(ProductStatus::default(), ProductStatus::Draft);
    }

    #[test]
    fn valid_form_produces_input() {
        let input = valid_form().validate().unwrap();
        assert_eq!(input.title, "Dune");
        assert_eq!(input.description, None);
        assert_eq!(input.status, ProductStatus::Active);
        assert_eq!(input.regular_price, Decimal::new(1000, 0));
        assert_eq!(input.stock_quantity, 4);
        assert_eq!(input.sku.as_deref(), Some("ISBN-1"));
        assert_eq!(input.category_ids, vec![3, 5]);
    }

    #[test]
    fn compare_at_not_above_regular_fails_on_that_field() {
        let form = ProductForm {
            compare_at_price: Some("900".into()),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.codes("compare_at_price"), vec![FieldErrorCode::Ordering]);
        assert_eq!(errors.fields().count(), 1);
    }

    #[test]
    fn compare_at_above_regular_passes() {
        let form = ProductForm {
            compare_at_price: Some("1200".into()),
            ..valid_form()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.compare_at_price, Some(Decimal::new(1200, 0)));
    }

    #[test]
    fn missing_categories_is_required_error() {
        let form = ProductForm {
            categories: vec![],
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.codes("categories"), vec![FieldErrorCode::Required]);
    }

    #[test]
    fn duplicate_categories_collapse() {
        let form = ProductForm {
            categories: vec!["2".into(), "2".into(), "9".into()],
            ..valid_form()
        };
        assert_eq!(form.validate().unwrap().category_ids, vec![2, 9]);
    }

    #[test]
    fn malformed_category_id_is_invalid() {
        let form = ProductForm {
            categories: vec!["abc".into()],
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.codes("categories"), vec![FieldErrorCode::Invalid]);
    }

    #[test]
    fn blank_sku_normalizes_to_none() {
        let form = ProductForm {
            sku: Some("   ".into()),
            ..valid_form()
        };
        assert_eq!(form.validate().unwrap().sku, None);
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = ProductForm::default().validate().unwrap_err();
        for field in ["title", "status", "regular_price", "stock_quantity", "categories"] {
            assert_eq!(errors.codes(field), vec![FieldErrorCode::Required], "{field}");
        }
    }

    #[test]
    fn unknown_status_is_invalid() {
        let form = ProductForm {
            status: Some("archived".into()),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.codes("status"), vec![FieldErrorCode::Invalid]);
    }
}
