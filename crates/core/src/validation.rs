//! Field-keyed validation errors and form value parsers.
//!
//! Admin forms arrive as flat string fields. The parsers here turn those raw
//! strings into typed values, recording a [`FieldError`] under the originating
//! field name for anything that does not parse so the rendering layer can
//! attach every message to its input in one round trip.

use std::collections::BTreeMap;
use std::num::IntErrorKind;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::DbId;

/// Maximum length for short text columns (titles, names, SKUs).
pub const MAX_SHORT_TEXT: usize = 255;

/// Largest value a NUMERIC(10,2) column can hold.
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Classification of a single field failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    /// A required value was missing or blank.
    Required,
    /// The value could not be parsed as the expected type.
    Invalid,
    /// The value was outside its allowed numeric range.
    Range,
    /// The value exceeded its maximum length.
    Length,
    /// Two related values were in the wrong order (compare-at vs regular price).
    Ordering,
    /// The value collides with another record (SKU).
    Unique,
    /// A referenced record does not exist.
    Exists,
    /// The value would create a cycle in the category tree.
    Cycle,
    /// An uploaded file violated the upload policy.
    File,
}

/// One failure attached to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub code: FieldErrorCode,
    pub message: String,
}

/// Field name -> failures, ordered by field name for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection holding a single failure.
    pub fn single(field: &str, code: FieldErrorCode, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, code, message);
        errors
    }

    pub fn add(&mut self, field: &str, code: FieldErrorCode, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(FieldError {
                code,
                message: message.into(),
            });
    }

    /// Move every failure from `other` into `self`.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, errs) in other.fields {
            self.fields.entry(field).or_default().extend(errs);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Codes recorded for `field`, in insertion order.
    pub fn codes(&self, field: &str) -> Vec<FieldErrorCode> {
        self.get(field)
            .map(|errs| errs.iter().map(|e| e.code).collect())
            .unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, errs) in &self.fields {
            for err in errs {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {}", err.message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Trim `value`, mapping blank input to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A non-blank string of at most `max_len` characters.
pub fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Option<String> {
    match optional_text(value) {
        None => {
            errors.add(field, FieldErrorCode::Required, format!("The {} field is required.", label(field)));
            None
        }
        Some(text) => check_length(errors, field, text, max_len),
    }
}

/// An optional string of at most `max_len` characters.
pub fn optional_bounded_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Option<String> {
    optional_text(value).and_then(|text| check_length(errors, field, text, max_len))
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &str,
    text: String,
    max_len: usize,
) -> Option<String> {
    if text.chars().count() > max_len {
        errors.add(
            field,
            FieldErrorCode::Length,
            format!("The {} may not be greater than {max_len} characters.", label(field)),
        );
        None
    } else {
        Some(text)
    }
}

/// A required integer that must be zero or greater.
pub fn required_non_negative_int(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<i32> {
    let Some(raw) = optional_text(value) else {
        errors.add(field, FieldErrorCode::Required, format!("The {} field is required.", label(field)));
        return None;
    };
    match raw.parse::<i32>() {
        Ok(n) if n >= 0 => Some(n),
        Ok(_) => {
            errors.add(field, FieldErrorCode::Range, format!("The {} must be at least 0.", label(field)));
            None
        }
        Err(e) => {
            match e.kind() {
                IntErrorKind::PosOverflow => errors.add(
                    field,
                    FieldErrorCode::Range,
                    format!("The {} may not be greater than {}.", label(field), i32::MAX),
                ),
                IntErrorKind::NegOverflow => errors.add(
                    field,
                    FieldErrorCode::Range,
                    format!("The {} must be at least 0.", label(field)),
                ),
                _ => errors.add(
                    field,
                    FieldErrorCode::Invalid,
                    format!("The {} must be an integer.", label(field)),
                ),
            }
            None
        }
    }
}

/// A required non-negative money amount with at most two decimal places.
pub fn required_money(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<Decimal> {
    if optional_text(value).is_none() {
        errors.add(field, FieldErrorCode::Required, format!("The {} field is required.", label(field)));
        return None;
    }
    optional_money(errors, field, value)
}

/// An optional non-negative money amount; blank input is `None`.
pub fn optional_money(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<Decimal> {
    let raw = optional_text(value)?;
    let Ok(amount) = Decimal::from_str(&raw) else {
        errors.add(field, FieldErrorCode::Invalid, format!("The {} must be a number.", label(field)));
        return None;
    };
    if amount.is_sign_negative() && !amount.is_zero() {
        errors.add(field, FieldErrorCode::Range, format!("The {} must be at least 0.", label(field)));
        return None;
    }
    if amount.normalize().scale() > 2 {
        errors.add(
            field,
            FieldErrorCode::Invalid,
            format!("The {} may have at most two decimal places.", label(field)),
        );
        return None;
    }
    if amount > MAX_MONEY {
        errors.add(
            field,
            FieldErrorCode::Range,
            format!("The {} may not be greater than {MAX_MONEY}.", label(field)),
        );
        return None;
    }
    Some(amount.round_dp(2))
}

/// A boolean checkbox value. Absent means `false`.
///
/// Accepts `1/0`, `true/false`, `on/off`, `yes/no` (case-insensitive).
pub fn optional_bool(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> bool {
    let Some(raw) = optional_text(value) else {
        return false;
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => true,
        "0" | "false" | "off" | "no" => false,
        _ => {
            errors.add(field, FieldErrorCode::Invalid, format!("The {} field must be true or false.", label(field)));
            false
        }
    }
}

/// Parse a single record id.
pub fn parse_id(errors: &mut ValidationErrors, field: &str, raw: &str) -> Option<DbId> {
    match raw.trim().parse::<DbId>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.add(field, FieldErrorCode::Invalid, format!("The selected {} is invalid.", label(field)));
            None
        }
    }
}

/// Human label for a field name (`compare_at_price` -> `compare at price`).
pub fn label(field: &str) -> String {
    field.replace('_', " ")
}
