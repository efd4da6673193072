//! Row structs and repository result types.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching the
//! database row, plus the small result types its repository returns.

pub mod category;
pub mod product;
pub mod product_image;
