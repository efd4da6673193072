#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use catalog_api::auth::jwt::{generate_access_token, JwtConfig};
use catalog_api::config::ServerConfig;
use catalog_api::router::build_app_router;
use catalog_api::state::AppState;
use catalog_core::storage::{FileStorage, LocalFileStorage, StorageError};
use catalog_core::upload::{UploadPolicy, DEFAULT_MAX_IMAGE_BYTES};

pub const TEST_JWT_SECRET: &str = "catalog-test-secret";

/// Smallest byte strings the upload policy sniffs as images.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";

/// Build a test `ServerConfig` with safe defaults and the given storage root.
pub fn test_config(storage_root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage_root: storage_root.to_path_buf(),
        max_upload_bytes: DEFAULT_MAX_IMAGE_BYTES,
        max_request_bytes: 64 * 1024 * 1024,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The full application plus the temp directory its images are written to.
pub struct TestApp {
    pub router: Router,
    pub storage: TempDir,
    pub config: ServerConfig,
    /// Bearer token for a verified admin.
    pub token: String,
}

/// Build the application with the production middleware stack, backed by
/// the given pool and a fresh storage directory.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with_storage(pool, |root| {
        let storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(root));
        storage
    })
}

/// Build the application with a custom file store rooted in the test's
/// storage directory.
pub fn build_test_app_with_storage(
    pool: PgPool,
    make_storage: impl FnOnce(&Path) -> Arc<dyn FileStorage>,
) -> TestApp {
    let storage = tempfile::tempdir().unwrap();
    let config = test_config(storage.path());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: make_storage(storage.path()),
        uploads: UploadPolicy {
            max_bytes: config.max_upload_bytes,
        },
    };
    let router = build_app_router(state, &config);
    let token = generate_access_token(1, true, &config.jwt).unwrap();

    TestApp {
        router,
        storage,
        config,
        token,
    }
}

impl TestApp {
    /// Token for a signed-in user who has not verified their email.
    pub fn unverified_token(&self) -> String {
        generate_access_token(2, false, &self.config.jwt).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(self.authed(Method::GET, uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(self.authed(Method::DELETE, uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_empty(&self, uri: &str) -> Response<Body> {
        self.send(self.authed(Method::POST, uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_form(&self, uri: &str, form: MultipartForm) -> Response<Body> {
        self.send(form.into_request(self.authed(Method::POST, uri)))
            .await
    }

    pub async fn put_form(&self, uri: &str, form: MultipartForm) -> Response<Body> {
        self.send(form.into_request(self.authed(Method::PUT, uri)))
            .await
    }

    fn authed(&self, method: Method, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", self.token))
    }

    /// Whether a stored relative path exists on disk.
    pub fn stored(&self, path: &str) -> bool {
        self.storage.path().join(path).exists()
    }
}

/// Names of the files currently stored under `dir`.
pub fn stored_files(app: &TestApp, dir: &str) -> Vec<String> {
    match std::fs::read_dir(app.storage.path().join(dir)) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Failing file store
// ---------------------------------------------------------------------------

/// Local disk storage that can be told to fail writes, removals, or the
/// writability check.
pub struct FailingStorage {
    inner: LocalFileStorage,
    puts: AtomicUsize,
    fail_put_on: Option<usize>,
    fail_deletes: bool,
    fail_write_check: bool,
}

impl FailingStorage {
    pub fn new(root: &Path) -> Self {
        Self {
            inner: LocalFileStorage::new(root),
            puts: AtomicUsize::new(0),
            fail_put_on: None,
            fail_deletes: false,
            fail_write_check: false,
        }
    }

    /// Fail the `n`th call to `put` (1-based).
    pub fn fail_put_on(mut self, n: usize) -> Self {
        self.fail_put_on = Some(n);
        self
    }

    pub fn fail_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn fail_write_check(mut self) -> Self {
        self.fail_write_check = true;
        self
    }

    fn failure(path: &str) -> StorageError {
        StorageError::Io {
            path: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk unavailable"),
        }
    }
}

#[async_trait]
impl FileStorage for FailingStorage {
    async fn put(
        &self,
        bytes: &[u8],
        dir_hint: &str,
        extension: &str,
    ) -> Result<String, StorageError> {
        let call = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_put_on == Some(call) {
            return Err(Self::failure(dir_hint));
        }
        self.inner.put(bytes, dir_hint, extension).await
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        if self.fail_deletes {
            return Err(Self::failure(path));
        }
        self.inner.delete(path).await
    }

    async fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_write_check {
            return Err(Self::failure("."));
        }
        self.inner.check_writable().await
    }
}

/// Send an unauthenticated GET request.
pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    app.send(Request::get(uri).body(Body::empty()).unwrap()).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "catalog-test-boundary";

/// A `multipart/form-data` body assembled by hand.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn png(self, name: &str, file_name: &str) -> Self {
        self.file(name, file_name, "image/png", PNG)
    }

    fn into_request(mut self, builder: axum::http::request::Builder) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        builder
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a category through the API and return its id.
pub async fn create_category(app: &TestApp, name: &str, parent_id: Option<i64>) -> i64 {
    let parent = parent_id.map_or("none".to_string(), |id| id.to_string());
    let form = MultipartForm::new()
        .text("name", name)
        .text("display_order", "0")
        .text("parent_id", &parent);
    let response = app.post_form("/api/v1/admin/categories", form).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// A valid product form in the given categories.
pub fn product_form(title: &str, sku: Option<&str>, categories: &[i64]) -> MultipartForm {
    let mut form = MultipartForm::new()
        .text("title", title)
        .text("status", "active")
        .text("regular_price", "1000")
        .text("stock_quantity", "5");
    if let Some(sku) = sku {
        form = form.text("sku", sku);
    }
    for id in categories {
        form = form.text("categories[]", &id.to_string());
    }
    form
}

/// Create a product through the API and return its JSON `data`.
pub async fn create_product(app: &TestApp, form: MultipartForm) -> serde_json::Value {
    let response = app.post_form("/api/v1/admin/products", form).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
