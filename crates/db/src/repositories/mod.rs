//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-statement invariants run
//! inside a single transaction.

pub mod category_repo;
pub mod product_image_repo;
pub mod product_repo;

pub use category_repo::CategoryRepo;
pub use product_image_repo::ProductImageRepo;
pub use product_repo::ProductRepo;
