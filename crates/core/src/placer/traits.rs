use async_trait::async_trait;

use super::error::PlacerError;
use super::types::{FilePlacement, PlacedFile};

/// Puts one file at its final destination.
#[async_trait]
pub trait Placer: Send + Sync {
    fn name(&self) -> &str;

    /// Copies the file. Partial output is removed on failure.
    async fn place(&self, placement: FilePlacement) -> Result<PlacedFile, PlacerError>;
}
