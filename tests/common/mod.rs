//! Shared utilities for integration tests.
//!
//! Spawns a real server on an ephemeral port against a throwaway SQLite
//! file and drives it over HTTP.

use pos_server::config::ServerConfig;
use pos_server::lifecycle::Shutdown;
use pos_server::{db, users, HttpServer};
use sqlx::SqlitePool;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "bootstrap-password";

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    /// Direct database handle for assertions and operator-style tweaks
    /// (e.g., disabling an account).
    pub db: SqlitePool,
    _shutdown: Shutdown,
    _data_dir: tempfile::TempDir,
}

pub async fn spawn_app() -> TestApp {
    let data_dir = tempfile::tempdir().expect("create temp dir");

    let mut config = ServerConfig::default();
    config.database.url = format!("sqlite://{}/pos.db", data_dir.path().display());
    config.auth.secret = "integration-test-secret-0123456789".to_string();
    config.auth.bootstrap_username = ADMIN_USERNAME.to_string();
    config.auth.bootstrap_password = ADMIN_PASSWORD.to_string();
    config.observability.metrics_enabled = false;

    let pool = db::connect(&config.database).await.expect("connect database");
    db::ensure_schema(&pool).await.expect("apply schema");
    users::bootstrap_superuser(&pool, &config.auth)
        .await
        .expect("bootstrap superuser");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, pool.clone());
    tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestApp {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        db: pool,
        _shutdown: shutdown,
        _data_dir: data_dir,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("login request")
    }

    pub async fn token(&self, username: &str, password: &str) -> String {
        let response = self.login(username, password).await;
        assert!(
            response.status().is_success(),
            "login for '{username}' failed: {}",
            response.status()
        );
        let body: serde_json::Value = response.json().await.expect("token body");
        body["access_token"]
            .as_str()
            .expect("access_token field")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn create_user(
        &self,
        admin_token: &str,
        username: &str,
        password: &str,
        is_superuser: bool,
    ) -> reqwest::Response {
        self.client
            .post(self.url("/users"))
            .bearer_auth(admin_token)
            .json(&serde_json::json!({
                "username": username,
                "password": password,
                "is_superuser": is_superuser,
            }))
            .send()
            .await
            .expect("create user request")
    }

    pub async fn create_store(&self, token: &str, name: &str) -> i64 {
        let response = self
            .client
            .post(self.url("/store"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await
            .expect("create store request");
        assert_eq!(response.status().as_u16(), 201);
        let body: serde_json::Value = response.json().await.expect("store body");
        body["id"].as_i64().expect("store id")
    }

    pub async fn create_item(&self, token: &str, name: &str, category: Option<&str>) -> i64 {
        let response = self
            .client
            .post(self.url("/item"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "name": name, "category": category }))
            .send()
            .await
            .expect("create item request");
        assert_eq!(response.status().as_u16(), 201);
        let body: serde_json::Value = response.json().await.expect("item body");
        body["id"].as_i64().expect("item id")
    }

    pub async fn create_transaction(
        &self,
        token: &str,
        store_id: i64,
        price: i64,
        items: &[(i64, i64)],
    ) -> serde_json::Value {
        let lines: Vec<_> = items
            .iter()
            .map(|(item_id, quantity)| {
                serde_json::json!({ "item_id": item_id, "quantity": quantity })
            })
            .collect();
        let response = self
            .client
            .post(self.url("/transaction"))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "store_id": store_id,
                "price": price,
                "items": lines,
            }))
            .send()
            .await
            .expect("create transaction request");
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.expect("transaction body")
    }
}

/// Detail string from an error body.
pub async fn detail(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.expect("error body");
    body["detail"].as_str().expect("detail field").to_string()
}
