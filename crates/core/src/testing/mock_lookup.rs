//! Mock bibliographic lookup for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::lookup::{BibliographicLookup, BookMatch, LookupError};

/// A recorded lookup query for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedLookupQuery {
    Search {
        title: String,
        author: Option<String>,
    },
    SearchIsbn {
        isbn: String,
    },
}

/// Mock implementation of the BibliographicLookup trait.
///
/// Provides controllable behavior for testing:
/// - Canned matches keyed by title (case-insensitive) or ISBN
/// - Simulated latency
/// - Error injection
/// - Query recording
///
/// # Example
///
/// ```rust,ignore
/// use audioshelf_core::testing::MockLookup;
///
/// let lookup = MockLookup::new();
/// lookup.add_match("my book", BookMatch::new("My Book", vec!["Jane Doe".into()])).await;
///
/// let found = lookup.search("My Book", None).await?;
/// assert!(found.is_some());
/// ```
#[derive(Debug)]
pub struct MockLookup {
    /// Matches by lowercased title.
    by_title: Arc<RwLock<HashMap<String, BookMatch>>>,
    /// Matches by ISBN.
    by_isbn: Arc<RwLock<HashMap<String, BookMatch>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedLookupQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<LookupError>>>,
    /// Simulated latency per request.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLookup {
    /// Create a mock that matches nothing.
    pub fn new() -> Self {
        Self {
            by_title: Arc::new(RwLock::new(HashMap::new())),
            by_isbn: Arc::new(RwLock::new(HashMap::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Answer title searches for `title` with `found`.
    pub async fn add_match(&self, title: &str, found: BookMatch) {
        self.by_title
            .write()
            .await
            .insert(title.to_lowercase(), found);
    }

    /// Answer ISBN searches for `isbn` with `found`.
    pub async fn add_isbn_match(&self, isbn: &str, found: BookMatch) {
        self.by_isbn.write().await.insert(isbn.to_string(), found);
    }

    /// Set the simulated latency of every request.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: LookupError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedLookupQuery> {
        self.queries.read().await.clone()
    }

    /// Get the number of queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    async fn begin(&self, query: RecordedLookupQuery) -> Result<(), LookupError> {
        self.queries.write().await.push(query);

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BibliographicLookup for MockLookup {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<Option<BookMatch>, LookupError> {
        self.begin(RecordedLookupQuery::Search {
            title: title.to_string(),
            author: author.map(str::to_string),
        })
        .await?;

        Ok(self.by_title.read().await.get(&title.to_lowercase()).cloned())
    }

    async fn search_isbn(&self, isbn: &str) -> Result<Option<BookMatch>, LookupError> {
        self.begin(RecordedLookupQuery::SearchIsbn {
            isbn: isbn.to_string(),
        })
        .await?;

        Ok(self.by_isbn.read().await.get(isbn).cloned())
    }
}
