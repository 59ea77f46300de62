//! HTTP client for the external job board service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

use super::models::{BoardVacancy, SearchResponse, VacancyDetails};

lazy_static! {
    static ref HTML_TAG_REGEX: Regex = Regex::new("<.*?>").expect("invalid html tag regex");
}

/// Removes markup like `<p>` and `<br>` from a board description.
pub(super) fn strip_html_tags(raw: &str) -> String {
    HTML_TAG_REGEX.replace_all(raw, "").into_owned()
}

/// Seam between the HTTP routes and the board backend, stubbed out in tests.
#[async_trait]
pub trait JobBoard: Send + Sync {
    /// Searches listings for a free-text query.
    async fn search(&self, text: &str) -> Result<Vec<BoardVacancy>>;

    /// Fetches the full plain-text description of a vacancy.
    ///
    /// Returns `None` when the board does not know the vacancy.
    async fn vacancy_full_text(&self, board_id: &str) -> Result<Option<String>>;
}

/// Client for an hh.ru style job board.
pub struct HhJobBoard {
    client: reqwest::Client,
    base_url: String,
    areas: Vec<u32>,
    per_page: u32,
}

impl HhJobBoard {
    /// # Arguments
    /// * `base_url` - Base URL of the board API (e.g., "https://api.hh.ru")
    /// * `areas` - Board area codes to restrict the search to
    /// * `per_page` - Page size for search requests
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, areas: Vec<u32>, per_page: u32, timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            areas,
            per_page,
        }
    }
}

#[async_trait]
impl JobBoard for HhJobBoard {
    async fn search(&self, text: &str) -> Result<Vec<BoardVacancy>> {
        let url = format!("{}/vacancies", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("text", text.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        for area in &self.areas {
            query.push(("area", area.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .context("Failed to connect to job board")?;

        if !response.status().is_success() {
            anyhow::bail!("Job board search failed with status {}", response.status());
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse job board search response")?;
        Ok(body.items)
    }

    async fn vacancy_full_text(&self, board_id: &str) -> Result<Option<String>> {
        let url = format!("{}/vacancies/{}", self.base_url, board_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch vacancy {} from job board", board_id))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let details: VacancyDetails = response
            .json()
            .await
            .with_context(|| format!("Failed to parse vacancy {} response", board_id))?;

        Ok(details
            .description
            .map(|html| strip_html_tags(&html))
            .filter(|text| !text.is_empty()))
    }
}
