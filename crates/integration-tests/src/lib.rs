//! Integration tests for Stock Home.
//!
//! # Running Tests
//!
//! ```bash
//! # Scenario tests over the filter and report services (no database)
//! cargo test -p stock-home-integration-tests
//!
//! # HTTP tests against a running server with a migrated database
//! sh-cli migrate
//! STOCK_HOME_TEST_URL=http://127.0.0.1:3000 \
//!     cargo test -p stock-home-integration-tests -- --ignored
//! ```
//!
//! The HTTP tests expect `STOCK_HOME_REQUIRE_EMAIL_CONFIRMATION` to be off
//! so freshly created accounts can sign in. Every test signs up its own
//! accounts with unique emails, so runs do not interfere with each other.

use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

/// Default server address when `STOCK_HOME_TEST_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "rahasia123";

/// An HTTP client with its own cookie jar, i.e. one signed-in browser.
pub struct TestClient {
    client: Client,
    base_url: String,
}

/// A signed-up account.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub email: String,
    pub name: String,
}

impl TestClient {
    /// Client for the server named by `STOCK_HOME_TEST_URL`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let base_url = std::env::var("STOCK_HOME_TEST_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");
        Self { client, base_url }
    }

    /// Absolute URL for a path such as `/auth/session`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn get(&self, path: &str) -> reqwest::Result<Response> {
        self.client.get(self.url(path)).send().await
    }

    /// POST a JSON body to a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Result<Response> {
        self.client.post(self.url(path)).json(body).send().await
    }

    /// PUT a JSON body to a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn put(&self, path: &str, body: &Value) -> reqwest::Result<Response> {
        self.client.put(self.url(path)).json(body).send().await
    }

    /// DELETE a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn delete(&self, path: &str) -> reqwest::Result<Response> {
        self.client.delete(self.url(path)).send().await
    }

    /// Sign up a fresh account and keep its session.
    ///
    /// # Panics
    ///
    /// Panics if the server does not answer `201 Created`.
    #[allow(clippy::expect_used)]
    pub async fn sign_up(&self, name: &str) -> TestAccount {
        let email = unique_email(name);
        let response = self
            .post(
                "/auth/sign-up",
                &json!({ "email": email, "password": TEST_PASSWORD, "display_name": name }),
            )
            .await
            .expect("sign-up request failed");
        assert_eq!(response.status(), StatusCode::CREATED, "sign-up for {email}");
        TestAccount {
            email,
            name: name.to_owned(),
        }
    }

    /// Create a house owned by the signed-in user and return its URL path
    /// prefix, e.g. `/house/Rumah%20A`.
    ///
    /// # Panics
    ///
    /// Panics if the server does not answer `201 Created`.
    #[allow(clippy::expect_used)]
    pub async fn create_house(&self, name: &str) -> String {
        let response = self
            .post("/houses", &json!({ "name": name }))
            .await
            .expect("create house request failed");
        assert_eq!(response.status(), StatusCode::CREATED, "create house {name}");
        let body: Value = response.json().await.expect("house body");
        body["dashboard_path"]
            .as_str()
            .and_then(|p| p.strip_suffix("/dashboard"))
            .expect("dashboard_path ends with /dashboard")
            .to_owned()
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// A lowercase email that no other test run will use.
#[must_use]
pub fn unique_email(name: &str) -> String {
    format!("{}-{}@test.stockhome.local", name.to_lowercase(), uuid::Uuid::new_v4().simple())
}

/// Read the `error` field of a JSON error body.
///
/// # Panics
///
/// Panics if the body is not a JSON object with a string `error` field.
#[allow(clippy::expect_used)]
pub async fn error_message(response: Response) -> String {
    let body: Value = response.json().await.expect("JSON error body");
    body["error"].as_str().expect("error field").to_owned()
}
