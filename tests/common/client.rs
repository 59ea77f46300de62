//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all hunter-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows.
    /// For most tests, use `authenticated()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client pre-authenticated as the first test user
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        let client = Self::new(base_url);

        let response = client.login(TEST_EMAIL, TEST_PASS).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Test user authentication failed: {:?}",
            response.text().await
        );

        client
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /v1/auth/register
    pub async fn register(&self, email: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/v1/auth/register", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Register request failed")
    }

    /// POST /v1/auth/login
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/v1/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// GET /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .get(format!("{}/v1/auth/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    // ========================================================================
    // Vacancy Endpoints
    // ========================================================================

    /// GET /v1/vacancies?text={text}
    pub async fn search_vacancies(&self, text: &str) -> Response {
        self.client
            .get(format!("{}/v1/vacancies", self.base_url))
            .query(&[("text", text)])
            .send()
            .await
            .expect("Search vacancies request failed")
    }

    /// GET /v1/vacancies/{id}
    pub async fn get_vacancy(&self, id: usize) -> Response {
        self.client
            .get(format!("{}/v1/vacancies/{}", self.base_url, id))
            .send()
            .await
            .expect("Get vacancy request failed")
    }

    /// POST /v1/vacancies/{board_id}/fill
    pub async fn fill_vacancy(&self, board_id: &str) -> Response {
        self.client
            .post(format!("{}/v1/vacancies/{}/fill", self.base_url, board_id))
            .send()
            .await
            .expect("Fill vacancy request failed")
    }

    // ========================================================================
    // Resume Endpoints
    // ========================================================================

    /// POST /v1/resumes
    pub async fn post_resume(&self, content: &str) -> Response {
        self.client
            .post(format!("{}/v1/resumes", self.base_url))
            .json(&json!({ "content": content }))
            .send()
            .await
            .expect("Post resume request failed")
    }

    /// GET /v1/resumes
    pub async fn get_resumes(&self) -> Response {
        self.client
            .get(format!("{}/v1/resumes", self.base_url))
            .send()
            .await
            .expect("Get resumes request failed")
    }

    // ========================================================================
    // Match / Task Endpoints
    // ========================================================================

    /// POST /v1/match
    pub async fn post_match(&self, resume_id: usize, vacancy_id: usize) -> Response {
        self.client
            .post(format!("{}/v1/match", self.base_url))
            .json(&json!({ "resume_id": resume_id, "vacancy_id": vacancy_id }))
            .send()
            .await
            .expect("Post match request failed")
    }

    /// GET /v1/tasks/{task_id}
    pub async fn get_task(&self, task_id: &str) -> Response {
        self.client
            .get(format!("{}/v1/tasks/{}", self.base_url, task_id))
            .send()
            .await
            .expect("Get task request failed")
    }

    /// Polls a task until its status is SUCCESS or FAILURE, returning the
    /// final task body.
    ///
    /// # Panics
    ///
    /// Panics if the task does not reach a terminal state in time.
    pub async fn poll_task_until_terminal(&self, task_id: &str) -> serde_json::Value {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(TASK_TERMINAL_TIMEOUT_MS);

        loop {
            let response = self.get_task(task_id).await;
            assert_eq!(response.status(), reqwest::StatusCode::OK);
            let body: serde_json::Value = response.json().await.expect("Task body is not JSON");

            let status = body["status"].as_str().expect("Task status missing");
            if status == "SUCCESS" || status == "FAILURE" {
                return body;
            }

            if start.elapsed() > timeout {
                panic!(
                    "Task {} still {} after {}ms",
                    task_id, status, TASK_TERMINAL_TIMEOUT_MS
                );
            }
            tokio::time::sleep(Duration::from_millis(TASK_POLL_INTERVAL_MS)).await;
        }
    }

    // ========================================================================
    // Misc Endpoints
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    /// GET /metrics
    pub async fn get_metrics(&self) -> Response {
        self.client
            .get(format!("{}/metrics", self.base_url))
            .send()
            .await
            .expect("Metrics request failed")
    }
}
