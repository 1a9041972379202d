//! Bibliographic lookup capability.
//!
//! The external tier of the metadata pipeline queries a
//! [`BibliographicLookup`]. [`GoogleBooksClient`] is the production adapter;
//! `testing::MockLookup` is the deterministic fake.

mod google_books;
mod types;

pub use google_books::GoogleBooksClient;
pub use types::BookMatch;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying a bibliographic service.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The request did not complete in time.
    #[error("Lookup timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// A searchable bibliographic catalog. First result wins.
#[async_trait]
pub trait BibliographicLookup: Send + Sync {
    /// Returns the name of this lookup implementation.
    fn name(&self) -> &str;

    /// Search by title, narrowed by author when known.
    async fn search(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<Option<BookMatch>, LookupError>;

    /// Search by ISBN-13. Catalogs without identifier search report no match.
    async fn search_isbn(&self, _isbn: &str) -> Result<Option<BookMatch>, LookupError> {
        Ok(None)
    }
}
