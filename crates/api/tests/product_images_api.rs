//! HTTP-level tests for the product image gallery and its primary flag.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_category, create_product, product_form, MultipartForm, JPEG};
use sqlx::PgPool;

const PRODUCTS: &str = "/api/v1/admin/products";

/// Create a product with images named `names`, returning (product id, image ids in order).
async fn product_with_images(app: &common::TestApp, names: &[&str]) -> (i64, Vec<i64>) {
    let category = create_category(app, "Fiction", None).await;
    let mut form = product_form("Dune", None, &[category]);
    for name in names {
        form = form.png("images[]", name);
    }
    let product = create_product(app, form).await;
    let ids = product["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect();
    (product["id"].as_i64().unwrap(), ids)
}

async fn images_of(app: &common::TestApp, product_id: i64) -> Vec<serde_json::Value> {
    let json = body_json(app.get(&format!("{PRODUCTS}/{product_id}")).await).await;
    json["data"]["images"].as_array().unwrap().clone()
}

fn primary_ids(images: &[serde_json::Value]) -> Vec<i64> {
    images
        .iter()
        .filter(|i| i["is_primary"] == true)
        .map(|i| i["id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Attach on create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_uploaded_image_becomes_primary(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (id, image_ids) = product_with_images(&app, &["a.png", "b.png", "c.png"]).await;

    let images = images_of(&app, id).await;

    let orders: Vec<i64> = images
        .iter()
        .map(|i| i["display_order"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_eq!(primary_ids(&images), vec![image_ids[0]]);
    assert!(images
        .iter()
        .all(|i| app.stored(i["image_path"].as_str().unwrap())));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bad_file_in_batch_rejects_the_whole_create(pool: PgPool) {
    let app = common::build_test_app(pool);
    let category = create_category(&app, "Fiction", None).await;

    let form = product_form("Dune", None, &[category])
        .png("images[]", "a.png")
        .file("images[]", "virus.exe", "application/octet-stream", b"MZ\x90\0");
    let response = app.post_form(PRODUCTS, form).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["images.1"][0]["code"], "file");
    assert!(json["fields"]["images.0"].is_null());

    let json = body_json(app.get(PRODUCTS).await).await;
    assert_eq!(json["total"], 0);
    let products_dir = app.storage.path().join("products");
    let stored = std::fs::read_dir(&products_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(stored, 0);
}

// ---------------------------------------------------------------------------
// Append
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn appended_images_continue_order_and_keep_primary(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (id, image_ids) = product_with_images(&app, &["a.png", "b.png"]).await;

    let form = MultipartForm::new()
        .png("images[]", "c.png")
        .file("images[]", "d.jpg", "image/jpeg", JPEG);
    let response = app.post_form(&format!("{PRODUCTS}/{id}/images"), form).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Images uploaded successfully.");
    let added = json["data"].as_array().unwrap();
    assert_eq!(added.len(), 2);
    assert_eq!(added[0]["display_order"], 2);
    assert_eq!(added[1]["display_order"], 3);
    assert!(added.iter().all(|i| i["is_primary"] == false));
    assert!(added[1]["image_path"].as_str().unwrap().ends_with(".jpg"));

    let images = images_of(&app, id).await;
    assert_eq!(images.len(), 4);
    assert_eq!(primary_ids(&images), vec![image_ids[0]]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn appending_to_a_product_without_images_leaves_no_primary(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (id, _) = product_with_images(&app, &[]).await;

    let response = app
        .post_form(
            &format!("{PRODUCTS}/{id}/images"),
            MultipartForm::new().png("images[]", "a.png"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"][0]["display_order"], 0);

    let images = images_of(&app, id).await;
    assert!(primary_ids(&images).is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn append_requires_at_least_one_image(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (id, _) = product_with_images(&app, &["a.png"]).await;

    let response = app
        .post_form(&format!("{PRODUCTS}/{id}/images"), MultipartForm::new())
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["images"][0]["code"], "required");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn append_to_missing_product_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = app
        .post_form(
            &format!("{PRODUCTS}/5555/images"),
            MultipartForm::new().png("images[]", "a.png"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Remove
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn removing_the_primary_promotes_the_next_by_order(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (id, image_ids) = product_with_images(&app, &["a.png", "b.png", "c.png"]).await;
    let before = images_of(&app, id).await;
    let removed_path = before[0]["image_path"].as_str().unwrap().to_string();

    let response = app
        .delete(&format!("{PRODUCTS}/{id}/images/{}", image_ids[0]))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Image deleted successfully.");
    assert_eq!(json["data"]["promoted"]["id"], image_ids[1]);
    assert!(!app.stored(&removed_path));

    let images = images_of(&app, id).await;
    assert_eq!(images.len(), 2);
    assert_eq!(primary_ids(&images), vec![image_ids[1]]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn removing_a_secondary_image_keeps_the_primary(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (id, image_ids) = product_with_images(&app, &["a.png", "b.png", "c.png"]).await;

    let response = app
        .delete(&format!("{PRODUCTS}/{id}/images/{}", image_ids[1]))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["promoted"].is_null());
    assert_eq!(primary_ids(&images_of(&app, id).await), vec![image_ids[0]]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn removing_the_last_image_leaves_no_primary(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (id, image_ids) = product_with_images(&app, &["a.png"]).await;

    let response = app
        .delete(&format!("{PRODUCTS}/{id}/images/{}", image_ids[0]))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(app.get(&format!("{PRODUCTS}/{id}")).await).await;
    assert_eq!(json["data"]["images"], serde_json::json!([]));
    assert!(json["data"]["primary_image"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn another_products_image_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (first, first_images) = product_with_images(&app, &["a.png"]).await;
    let category = create_category(&app, "Poetry", None).await;
    let second = create_product(&app, product_form("Emma", None, &[category]))
        .await["id"]
        .as_i64()
        .unwrap();

    let response = app
        .delete(&format!("{PRODUCTS}/{second}/images/{}", first_images[0]))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post_empty(&format!("{PRODUCTS}/{second}/images/{}/primary", first_images[0]))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Untouched on its real owner.
    assert_eq!(primary_ids(&images_of(&app, first).await), vec![first_images[0]]);
}

// ---------------------------------------------------------------------------
// Promote
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn promoting_moves_the_single_primary_flag(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (id, image_ids) = product_with_images(&app, &["a.png", "b.png", "c.png"]).await;

    let response = app
        .post_empty(&format!("{PRODUCTS}/{id}/images/{}/primary", image_ids[2]))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Primary image updated successfully.");
    assert_eq!(json["data"]["id"], image_ids[2]);
    assert_eq!(json["data"]["is_primary"], true);

    assert_eq!(primary_ids(&images_of(&app, id).await), vec![image_ids[2]]);

    // Promoting the current primary again changes nothing.
    let response = app
        .post_empty(&format!("{PRODUCTS}/{id}/images/{}/primary", image_ids[2]))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(primary_ids(&images_of(&app, id).await), vec![image_ids[2]]);
}
