//! Google Books volumes API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::types::BookMatch;
use super::{BibliographicLookup, LookupError};
use crate::config::LookupConfig;

/// Google Books API client.
pub struct GoogleBooksClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleBooksClient {
    /// Create a new client from configuration.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        if config.api_key.trim().is_empty() {
            return Err(LookupError::NotConfigured(
                "Google Books API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(concat!("audioshelf/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Runs a volumes query and returns the first item.
    async fn first_volume(&self, query: &str) -> Result<Option<BookMatch>, LookupError> {
        let url = format!("{}/volumes", self.base_url);

        debug!("Google Books search: q='{}'", query);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("maxResults", "1"),
                ("printType", "books"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == 429 {
            warn!("Google Books rate limit exceeded");
            return Err(LookupError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let volumes: VolumesResponse = response.json().await.map_err(|e| {
            LookupError::ParseError(format!("Failed to parse volumes response: {}", e))
        })?;

        Ok(volumes.into_first_match())
    }
}

#[async_trait]
impl BibliographicLookup for GoogleBooksClient {
    fn name(&self) -> &str {
        "google_books"
    }

    async fn search(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<Option<BookMatch>, LookupError> {
        self.first_volume(&build_query(title, author)).await
    }

    async fn search_isbn(&self, isbn: &str) -> Result<Option<BookMatch>, LookupError> {
        self.first_volume(&format!("isbn:{}", isbn)).await
    }
}

fn build_query(title: &str, author: Option<&str>) -> String {
    match author.map(str::trim).filter(|a| !a.is_empty()) {
        Some(author) => format!("intitle:{} inauthor:{}", title.trim(), author),
        None => format!("intitle:{}", title.trim()),
    }
}

// ============================================================================
// Google Books API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
struct VolumeInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(rename = "publishedDate", default)]
    published_date: Option<String>,
}

impl VolumesResponse {
    fn into_first_match(self) -> Option<BookMatch> {
        let info = self.items.into_iter().next()?.volume_info;
        let title = info.title.filter(|t| !t.trim().is_empty())?;
        Some(BookMatch {
            title,
            authors: info.authors,
            published_date: info.published_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query() {
        assert_eq!(build_query("My Book", None), "intitle:My Book");
        assert_eq!(
            build_query(" My Book ", Some("Jane Doe")),
            "intitle:My Book inauthor:Jane Doe"
        );
        assert_eq!(build_query("My Book", Some("  ")), "intitle:My Book");
    }

    #[test]
    fn test_parse_first_volume() {
        let json = r#"{
            "kind": "books#volumes",
            "totalItems": 2,
            "items": [
                {"volumeInfo": {"title": "My Book", "authors": ["Jane Doe", "John Roe"], "publishedDate": "2015-04"}},
                {"volumeInfo": {"title": "Other Book", "authors": ["Someone"]}}
            ]
        }"#;
        let response: VolumesResponse = serde_json::from_str(json).unwrap();
        let m = response.into_first_match().unwrap();
        assert_eq!(m.title, "My Book");
        assert_eq!(m.primary_author(), Some("Jane Doe"));
        assert_eq!(m.year(), Some(2015));
    }

    #[test]
    fn test_parse_no_items() {
        let json = r#"{"kind": "books#volumes", "totalItems": 0}"#;
        let response: VolumesResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_first_match().is_none());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let config = LookupConfig {
            api_key: String::new(),
            base_url: "http://localhost".to_string(),
            timeout_secs: 1,
        };
        assert!(matches!(
            GoogleBooksClient::new(&config),
            Err(LookupError::NotConfigured(_))
        ));
    }
}
