//! Remote server directory lookups

use crate::error::{AppError, Result};
use crate::models::{ServerCandidate, Settings};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Client for the speed test server directory.
///
/// One request per search. Failures surface immediately; retrying is the
/// caller's decision.
pub struct ServerDirectory {
    client: Client,
    endpoint: Url,
    limit: u32,
}

impl ServerDirectory {
    pub fn new(endpoint: &str, limit: u32, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::config(format!("Invalid directory URL '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoint, limit })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.directory_url, settings.directory_limit, settings.timeout())
    }

    /// Full query URL for a search term
    pub fn query_url(&self, term: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("engine", "js")
            .append_pair("search", term)
            .append_pair("limit", &self.limit.to_string());
        url
    }

    /// Search for candidates matching `term`.
    ///
    /// An empty list means the directory answered and nothing matched.
    pub async fn search(&self, term: &str) -> Result<Vec<ServerCandidate>> {
        if term.trim().is_empty() {
            return Err(AppError::validation("Search term cannot be empty"));
        }

        let url = self.query_url(term);

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::directory_unavailable(format!("Request to '{}' failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::directory_unavailable(format!(
                "HTTP {} for '{}'",
                response.status(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::directory_unavailable(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str::<Vec<ServerCandidate>>(&body)
            .map_err(|e| AppError::directory_malformed(format!("Expected a JSON array of servers: {}", e)))
    }
}
