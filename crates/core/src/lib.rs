//! Domain rules for the catalog back-office.
//!
//! Framework-agnostic: form validation, pricing math, upload policy, and the
//! file storage seam. Nothing here touches the database.

pub mod category;
pub mod error;
pub mod pagination;
pub mod pricing;
pub mod product;
pub mod storage;
pub mod types;
pub mod upload;
pub mod validation;
