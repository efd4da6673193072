//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use catalog_api::error::AppError;
use catalog_core::error::{CoreError, ReferentialConflict};
use catalog_core::storage::StorageError;
use catalog_core::validation::{FieldErrorCode, ValidationErrors};
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Product",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Product with id 42 not found");
}

#[tokio::test]
async fn field_errors_return_422_keyed_by_field() {
    let mut errors = ValidationErrors::new();
    errors.add(
        "compare_at_price",
        FieldErrorCode::Ordering,
        "Compare at price must be greater than regular price",
    );
    errors.add("sku", FieldErrorCode::Unique, "The sku has already been taken.");

    let (status, json) = error_to_response(AppError::Core(CoreError::Invalid(errors))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["compare_at_price"][0]["code"], "ordering");
    assert_eq!(
        json["fields"]["compare_at_price"][0]["message"],
        "Compare at price must be greater than regular price"
    );
    assert_eq!(json["fields"]["sku"][0]["code"], "unique");
}

#[tokio::test]
async fn referential_conflicts_return_409_with_distinct_reasons() {
    let (status, products) = error_to_response(AppError::Core(CoreError::Referential(
        ReferentialConflict::HasProducts,
    )))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(products["code"], "REFERENTIAL_CONFLICT");
    assert_eq!(products["reason"], "has_products");
    assert_eq!(products["error"], "Cannot delete category with products.");

    let (_, children) = error_to_response(AppError::Core(CoreError::Referential(
        ReferentialConflict::HasSubcategories,
    )))
    .await;
    assert_eq!(children["reason"], "has_subcategories");
    assert_ne!(children["error"], products["error"]);
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("malformed multipart body".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "malformed multipart body");
}

#[tokio::test]
async fn unauthorized_and_forbidden_map_to_401_and_403() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("no token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("unverified".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn storage_error_returns_500_without_leaking_paths() {
    let err = AppError::Storage(StorageError::Io {
        path: "products/secret.png".into(),
        source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "STORAGE_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("secret"));
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
