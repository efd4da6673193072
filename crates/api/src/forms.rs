//! Multipart form decoding.
//!
//! Admin mutations arrive as `multipart/form-data`. [`FormData`] collects
//! every part into text values and uploaded files keyed by field name, then
//! maps them onto the raw forms `catalog_core` validates. Repeated fields
//! may be sent as `name` or `name[]`.

use std::collections::HashMap;

use axum::extract::Multipart;
use catalog_core::category::CategoryForm;
use catalog_core::product::ProductForm;
use catalog_core::upload::UploadedFile;

use crate::error::{AppError, AppResult};

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl FormData {
    /// Drain a multipart body.
    ///
    /// A file input left empty is submitted by browsers as a part with an
    /// empty file name and no bytes; such parts are skipped.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = normalize_name(field.name().unwrap_or(""));
            if name.is_empty() {
                continue;
            }

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.entry(name).or_default().push(UploadedFile {
                        file_name: Some(file_name).filter(|n| !n.is_empty()),
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.fields.entry(name).or_default().push(text);
                }
            }
        }

        Ok(form)
    }

    /// First text value of a field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(|v| v.first()).cloned()
    }

    /// Every text value of a repeated field, in submission order.
    pub fn texts(&self, name: &str) -> Vec<String> {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Take every file submitted under a field.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }

    /// Take the first file submitted under a field.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.take_files(name).into_iter().next()
    }

    pub fn product_form(&self) -> ProductForm {
        ProductForm {
            title: self.text("title"),
            description: self.text("description"),
            status: self.text("status"),
            regular_price: self.text("regular_price"),
            compare_at_price: self.text("compare_at_price"),
            cost_per_item: self.text("cost_per_item"),
            stock_quantity: self.text("stock_quantity"),
            sku: self.text("sku"),
            categories: self.texts("categories"),
        }
    }

    pub fn category_form(&self) -> CategoryForm {
        CategoryForm {
            name: self.text("name"),
            description: self.text("description"),
            display_order: self.text("display_order"),
            parent_id: self.text("parent_id"),
            is_promotional: self.text("is_promotional"),
        }
    }
}

/// `images[]` and `images` name the same field.
fn normalize_name(raw: &str) -> String {
    raw.strip_suffix("[]").unwrap_or(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_suffix_is_stripped() {
        assert_eq!(normalize_name("images[]"), "images");
        assert_eq!(normalize_name("categories"), "categories");
    }

    #[test]
    fn product_form_maps_repeated_categories() {
        let mut form = FormData::default();
        form.fields.insert("title".into(), vec!["Dune".into()]);
        form.fields
            .insert("categories".into(), vec!["1".into(), "2".into()]);

        let product = form.product_form();
        assert_eq!(product.title.as_deref(), Some("Dune"));
        assert_eq!(product.categories, vec!["1", "2"]);
        assert_eq!(product.sku, None);
    }

    #[test]
    fn take_file_consumes_the_field() {
        let mut form = FormData::default();
        form.files.insert(
            "image".into(),
            vec![UploadedFile {
                file_name: Some("a.png".into()),
                content_type: None,
                bytes: vec![1],
            }],
        );
        assert!(form.take_file("image").is_some());
        assert!(form.take_file("image").is_none());
    }
}
