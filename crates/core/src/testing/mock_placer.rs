//! Mock placer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::placer::{FilePlacement, FsPlacer, PlacedFile, Placer, PlacerError};

/// A recorded placement for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPlacement {
    /// The placement that was submitted.
    pub placement: FilePlacement,
    /// Whether the placement succeeded.
    pub success: bool,
}

/// Mock implementation of the Placer trait.
///
/// Copies through a real [`FsPlacer`] so destination trees can be asserted
/// on, while allowing failures to be injected:
/// - Track placements for assertions
/// - Fail the next placement
/// - Fail every placement whose destination contains a pattern
///
/// # Example
///
/// ```rust,ignore
/// use audioshelf_core::testing::MockPlacer;
///
/// let placer = MockPlacer::new();
/// placer.fail_destinations_containing("broken").await;
///
/// let result = placer.place(placement).await;
/// assert_eq!(placer.placement_count().await, 1);
/// ```
pub struct MockPlacer {
    inner: FsPlacer,
    /// Recorded placements.
    placements: Arc<RwLock<Vec<RecordedPlacement>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<PlacerError>>>,
    /// Destinations containing any of these fail with a copy error.
    failing_patterns: Arc<RwLock<Vec<String>>>,
}

impl Default for MockPlacer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlacer {
    /// Create a new mock placer.
    pub fn new() -> Self {
        Self {
            inner: FsPlacer::with_defaults(),
            placements: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_patterns: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get all recorded placements.
    pub async fn recorded_placements(&self) -> Vec<RecordedPlacement> {
        self.placements.read().await.clone()
    }

    /// Get the number of placements performed.
    pub async fn placement_count(&self) -> usize {
        self.placements.read().await.len()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: PlacerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Fail every placement whose destination path contains `pattern`.
    pub async fn fail_destinations_containing(&self, pattern: &str) {
        self.failing_patterns
            .write()
            .await
            .push(pattern.to_string());
    }

    async fn injected_error(&self, placement: &FilePlacement) -> Option<PlacerError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Some(err);
        }

        let destination = placement.destination.to_string_lossy();
        let patterns = self.failing_patterns.read().await;
        patterns
            .iter()
            .any(|p| destination.contains(p.as_str()))
            .then(|| {
                PlacerError::copy_failed(
                    placement.source.clone(),
                    placement.destination.clone(),
                    std::io::Error::other("simulated disk full"),
                )
            })
    }
}

#[async_trait]
impl Placer for MockPlacer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn place(&self, placement: FilePlacement) -> Result<PlacedFile, PlacerError> {
        let result = match self.injected_error(&placement).await {
            Some(err) => Err(err),
            None => self.inner.place(placement.clone()).await,
        };

        self.placements.write().await.push(RecordedPlacement {
            placement,
            success: result.is_ok(),
        });
        result
    }
}
