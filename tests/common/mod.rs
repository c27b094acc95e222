#![allow(dead_code)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use workforce::config::{Config, JwtConfig};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: std::net::SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Register the bootstrap user (first user = administrator).
    pub async fn register(&self, username: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/register"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("register request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Login and return the token pair body + status.
    pub async fn login(&self, username: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Register the bootstrap administrator, return its access token.
    pub async fn bootstrap(&self) -> String {
        let (body, status) = self.register(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::CREATED, "bootstrap register failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn role_id(&self, token: &str, role_name: &str) -> String {
        let (body, status) = self.get_auth("/api/v1/roles", token).await;
        assert_eq!(status, StatusCode::OK, "list roles failed: {body}");
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["role_name"] == role_name)
            .unwrap_or_else(|| panic!("role {role_name} not seeded"))["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Create a user holding `role_name` (or no role) and return its access token.
    pub async fn token_for(&self, admin_token: &str, username: &str, role_name: Option<&str>) -> String {
        let mut role_ids = vec![];
        if let Some(role_name) = role_name {
            role_ids.push(self.role_id(admin_token, role_name).await);
        }
        self.create(
            admin_token,
            "/api/v1/users",
            &json!({ "username": username, "password": "password123", "role_ids": role_ids }),
        )
        .await;

        let (body, status) = self.login(username, "password123").await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// POST a resource, assert 201 and return the created JSON.
    pub async fn create(&self, token: &str, path: &str, body: &Value) -> Value {
        let (created, status) = self.post_auth(path, token, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {path} failed: {created}");
        created
    }

    pub async fn create_department(&self, token: &str, name: &str) -> Value {
        self.create(
            token,
            "/api/v1/departments",
            &json!({ "department_name": name, "location": "HN" }),
        )
        .await
    }

    pub async fn create_position(&self, token: &str, name: &str) -> Value {
        self.create(
            token,
            "/api/v1/positions",
            &json!({ "position_name": name, "base_salary": "1000.00" }),
        )
        .await
    }

    pub async fn create_employee(&self, token: &str, first: &str, last: &str, extra: Value) -> Value {
        let mut body = json!({
            "first_name": first,
            "last_name": last,
            "email": format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
            "hire_date": "2024-01-15",
        });
        if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                body.insert(k.clone(), v.clone());
            }
        }
        self.create(token, "/api/v1/employees", &body).await
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated PUT request with JSON body.
    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated DELETE request.
    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .expect("count failed")
    }
}

pub fn test_config(database_url: String) -> Config {
    Config {
        database_url,
        jwt: JwtConfig {
            secret: "test-jwt-secret-that-is-long-enough".to_string(),
            issuer: "workforce-test".to_string(),
            audience: "workforce-test-clients".to_string(),
        },
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        cors_origin: None,
        db_max_connections: 5,
        log_level: "warn".to_string(),
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Create a fresh database with migrations applied. Returns (pool, db name).
pub async fn fresh_database() -> (PgPool, String) {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let db_name = format!("workforce_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    (pool, db_name)
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let (pool, db_name) = fresh_database().await;
    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let app = workforce::build_app(pool.clone(), test_config(base_url));

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_name,
    }
}

/// Drop a test database created by `fresh_database`.
pub async fn drop_database(pool: PgPool, db_name: &str) {
    pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    drop_database(app.pool, &app.db_name).await;
}
