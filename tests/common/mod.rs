#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use docguard::config::AppConfig;
use docguard::infrastructure::{database, seed};
use docguard::services::storage::StorageService;
use docguard::{AppState, create_app};
use http_body_util::BodyExt;
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub struct MockStorageService {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    /// Drops every stored blob, simulating a lost object store.
    pub fn clear(&self) {
        self.files.lock().unwrap().clear();
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn upload_file(&self, key: &str, data: Vec<u8>) -> anyhow::Result<()> {
        self.files.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn get_file(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Key not found"))
    }

    async fn delete_file(&self, key: &str) -> anyhow::Result<()> {
        self.files.lock().unwrap().remove(key);
        Ok(())
    }

    async fn file_exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(key))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub storage: Arc<MockStorageService>,
}

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    seed::seed_detection_models(&db).await.unwrap();
    db
}

pub async fn spawn_app() -> TestApp {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("docguard=debug,tower_http=debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();

    let db = setup_test_db().await;
    let storage = Arc::new(MockStorageService::new());
    let state = AppState::new(db, storage.clone(), AppConfig::development());
    let app = create_app(state.clone());

    TestApp {
        app,
        state,
        storage,
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into()))
    };
    (status, json)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Registers `username` and returns `(token, user_id)`.
pub async fn register_and_login(app: &Router, username: &str) -> (String, String) {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            None,
            serde_json::json!({ "username": username, "password": "password123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            None,
            serde_json::json!({ "username": username, "password": "password123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    let token = body["access"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].as_str().unwrap().to_string();
    (token, user_id)
}

pub fn multipart_upload(
    token: &str,
    title: &str,
    filename: &str,
    data: &[u8],
    file_type: Option<&str>,
) -> Request<Body> {
    let boundary = "----docguardtestboundary7MA4YWxkTrZu0gW";
    let mut body = Vec::new();

    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{}\r\n",
            boundary, title
        )
        .as_bytes(),
    );
    if let Some(file_type) = file_type {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file_type\"\r\n\r\n{}\r\n",
                boundary, file_type
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            boundary, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/documents")
        .header("Authorization", format!("Bearer {}", token))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Uploads a small text document and returns its JSON representation.
pub async fn upload_text(app: &Router, token: &str, title: &str, content: &str) -> Value {
    let (status, body) = send(
        app,
        multipart_upload(token, title, "notes.txt", content.as_bytes(), None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "upload failed: {}", body);
    body
}

pub async fn profile(app: &Router, token: &str) -> Value {
    let (status, body) = send(app, get("/auth/profile", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    body
}

pub async fn processed_count(app: &Router, token: &str) -> i64 {
    profile(app, token).await["total_documents_processed"]
        .as_i64()
        .unwrap()
}
