use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::DatabaseConnection;
use serde_json::Value;

use ::common::storage::filesystem::FilesystemBlobStore;
use server::catalog::locks::KeyedLocks;
use server::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig, StorageConfig};
use server::state::AppState;

/// Base URL the test app advertises; kept-image references in this absolute
/// form must normalize back to store-relative paths.
pub const PUBLIC_URL: &str = "http://public.example";

pub mod routes {
    pub const CATEGORYS: &str = "/api/v1/categorys";
    pub const PRODUCTS: &str = "/api/v1/products";
    pub const USERS: &str = "/api/v1/users";

    pub fn category(id: i32) -> String {
        format!("{CATEGORYS}/{id}")
    }

    pub fn product(id: i32) -> String {
        format!("{PRODUCTS}/{id}")
    }

    pub fn user(id: i32) -> String {
        format!("{USERS}/{id}")
    }

    pub fn media(path: &str) -> String {
        format!("/media/{path}")
    }
}

/// A running test server on a private sqlite database and media tree.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    media_root: PathBuf,
    _dir: tempfile::TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let db = server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let media_root = dir.path().join("media");
        let blob_store = Arc::new(
            FilesystemBlobStore::new(media_root.clone())
                .await
                .expect("Failed to create blob store"),
        );

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                public_url: PUBLIC_URL.to_string(),
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig { url: db_url },
            storage: StorageConfig {
                media_root: media_root.clone(),
                max_upload_size: 8 * 1024 * 1024,
            },
        };

        let state = AppState {
            db: db.clone(),
            blob_store,
            catalog_locks: Arc::new(KeyedLocks::new()),
            config,
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            media_root,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Whether a store-relative media path exists on disk.
    pub fn media_file_exists(&self, relative: &str) -> bool {
        self.media_root.join(relative).exists()
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn get_raw(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");
        TestResponse::from_response(res).await
    }

    pub async fn post_multipart(&self, path: &str, form: Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart POST request");
        TestResponse::from_response(res).await
    }

    pub async fn patch_multipart(&self, path: &str, form: Form) -> TestResponse {
        let res = self
            .client
            .patch(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart PATCH request");
        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");
        TestResponse::from_response(res).await
    }

    /// Create a category via the API and return its `id`.
    pub async fn create_category(&self, name: &str) -> i32 {
        let form = Form::new()
            .text("name", name.to_string())
            .text("description", "test category");
        let res = self.post_multipart(routes::CATEGORYS, form).await;
        assert_eq!(res.status, 201, "create_category failed: {}", res.text);
        res.id()
    }

    /// Create a product with one image via the API and return the response.
    pub async fn create_product(&self, category_id: i32, name: &str) -> TestResponse {
        let form = product_form(category_id, name)
            .part("images", png_part("a.png"));
        let res = self.post_multipart(routes::PRODUCTS, form).await;
        assert_eq!(res.status, 201, "create_product failed: {}", res.text);
        res
    }
}

/// Base multipart form for product creation.
pub fn product_form(category_id: i32, name: &str) -> Form {
    Form::new()
        .text("category_id", category_id.to_string())
        .text("name", name.to_string())
        .text("description", "A fine product")
        .text("price", "19.90")
}

/// Base multipart form for product update.
pub fn product_update_form(name: &str) -> Form {
    Form::new()
        .text("name", name.to_string())
        .text("description", "A fine product")
        .text("price", "19.90")
}

/// A fake PNG upload part.
pub fn png_part(file_name: &str) -> Part {
    Part::bytes(b"not-really-a-png".to_vec())
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .expect("Failed to set MIME type")
}

/// Assert a JSON price field equals the expected decimal numerically.
///
/// sqlite has no decimal column type, so scale is not preserved exactly
/// ("19.90" may come back as "19.9"); compare values, not strings.
pub fn assert_price(actual: &Value, expected: &str) {
    let actual: rust_decimal::Decimal = actual
        .as_str()
        .unwrap_or_else(|| panic!("price field missing or not a string: {actual}"))
        .parse()
        .expect("price field is not a decimal");
    let expected: rust_decimal::Decimal = expected.parse().unwrap();
    assert_eq!(actual, expected);
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }

    /// The response's image reference list as strings.
    pub fn images(&self) -> Vec<String> {
        self.body["images"]
            .as_array()
            .expect("response body should contain 'images'")
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }
}
