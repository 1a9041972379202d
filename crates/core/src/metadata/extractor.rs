//! Tiered metadata extraction.
//!
//! Each [`ExtractionTier`] only fills fields that are still empty, so tier
//! order is precedence order: filename, then embedded tags, then the
//! external lookup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::filename::parse_filename;
use super::types::{FieldValue, MetadataRecord, SourceFile, Tier};
use crate::lookup::{BibliographicLookup, BookMatch, LookupError};
use crate::metrics;
use crate::tags::{EmbeddedTags, TagError, TagReader};

/// One stage of the resolution chain.
#[async_trait]
pub trait ExtractionTier: Send + Sync {
    fn tier(&self) -> Tier;

    /// Fills empty fields of `record`. Never fails; problems are logged.
    async fn apply(&self, file: &SourceFile, record: &mut MetadataRecord);
}

/// Parses author, title, series and ISBN out of the file name.
pub struct FilenameTier;

#[async_trait]
impl ExtractionTier for FilenameTier {
    fn tier(&self) -> Tier {
        Tier::Filename
    }

    async fn apply(&self, file: &SourceFile, record: &mut MetadataRecord) {
        parse_filename(file.stem()).apply_to(record);
    }
}

/// Reads embedded container tags.
pub struct TagTier {
    reader: Arc<dyn TagReader>,
}

impl TagTier {
    pub fn new(reader: Arc<dyn TagReader>) -> Self {
        Self { reader }
    }

    async fn read(&self, file: &SourceFile) -> Result<EmbeddedTags, TagError> {
        let reader = Arc::clone(&self.reader);
        let path = file.path.clone();
        tokio::task::spawn_blocking(move || reader.read(&path))
            .await
            .map_err(|e| TagError::TaskFailed(e.to_string()))?
    }
}

#[async_trait]
impl ExtractionTier for TagTier {
    fn tier(&self) -> Tier {
        Tier::EmbeddedTag
    }

    async fn apply(&self, file: &SourceFile, record: &mut MetadataRecord) {
        if !self.reader.supports(&file.path) {
            return;
        }

        let tags = match self.read(file).await {
            Ok(tags) => tags,
            Err(e) => {
                metrics::TAG_READ_FAILURES.inc();
                warn!(file = ?file.path, "Skipping embedded tags: {}", e);
                return;
            }
        };

        let tier = Tier::EmbeddedTag;
        record.fill_opt(tags.disc.map(FieldValue::DiscNumber), tier);
        record.fill_opt(tags.track.map(FieldValue::TrackNumber), tier);
        record.fill_opt(tags.title.map(FieldValue::Title), tier);
        record.fill_opt(tags.artist.map(FieldValue::Author), tier);
        record.fill_opt(tags.album.map(FieldValue::Series), tier);
        record.fill_opt(tags.year.map(FieldValue::PublishYear), tier);
    }
}

/// Queries the bibliographic catalog for files still missing author or title.
pub struct LookupTier {
    lookup: Arc<dyn BibliographicLookup>,
    timeout: Duration,
}

impl LookupTier {
    pub fn new(lookup: Arc<dyn BibliographicLookup>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    /// Runs the query for a partially resolved record. Failures and timeouts
    /// are logged and reported as no match.
    pub async fn query(&self, file: &SourceFile, record: &MetadataRecord) -> Option<BookMatch> {
        if let Some(isbn) = record.isbn.as_deref() {
            let found = self.guarded(self.lookup.search_isbn(isbn), file).await;
            if found.is_some() {
                return found;
            }
        }

        // Without a title the bare stem is the best query we have
        let title = record.title.as_deref().unwrap_or_else(|| file.stem());
        if title.trim().is_empty() {
            return None;
        }
        self.guarded(self.lookup.search(title, record.author.as_deref()), file)
            .await
    }

    async fn guarded<F>(&self, call: F, file: &SourceFile) -> Option<BookMatch>
    where
        F: std::future::Future<Output = Result<Option<BookMatch>, LookupError>>,
    {
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout(self.timeout)),
        };

        match result {
            Ok(Some(found)) => {
                metrics::LOOKUP_REQUESTS.with_label_values(&["match"]).inc();
                debug!(file = ?file.path, lookup = self.lookup.name(), "Lookup matched '{}'", found.title);
                Some(found)
            }
            Ok(None) => {
                metrics::LOOKUP_REQUESTS.with_label_values(&["no_match"]).inc();
                None
            }
            Err(LookupError::Timeout(d)) => {
                metrics::LOOKUP_REQUESTS.with_label_values(&["timeout"]).inc();
                warn!(file = ?file.path, "Lookup timed out after {:?}", d);
                None
            }
            Err(e) => {
                metrics::LOOKUP_REQUESTS.with_label_values(&["error"]).inc();
                warn!(file = ?file.path, "Lookup failed: {}", e);
                None
            }
        }
    }
}

/// Copies a lookup match into the empty fields of a record.
pub fn apply_match(found: BookMatch, record: &mut MetadataRecord) {
    let tier = Tier::ExternalLookup;
    let year = found.year();
    let author = found.primary_author().map(str::to_string);
    record.fill(FieldValue::Title(found.title), tier);
    record.fill_opt(author.map(FieldValue::Author), tier);
    record.fill_opt(year.map(FieldValue::PublishYear), tier);
}

#[async_trait]
impl ExtractionTier for LookupTier {
    fn tier(&self) -> Tier {
        Tier::ExternalLookup
    }

    async fn apply(&self, file: &SourceFile, record: &mut MetadataRecord) {
        if record.has_title() && record.has_author() {
            return;
        }
        if let Some(found) = self.query(file, record).await {
            apply_match(found, record);
        }
    }
}

/// Runs the tiers in order over one file.
pub struct MetadataExtractor {
    tiers: Vec<Box<dyn ExtractionTier>>,
    lookup: Option<LookupTier>,
}

impl MetadataExtractor {
    /// Builds the standard chain. Missing capabilities skip their tier.
    pub fn new(
        tag_reader: Option<Arc<dyn TagReader>>,
        lookup: Option<Arc<dyn BibliographicLookup>>,
        lookup_timeout: Duration,
    ) -> Self {
        let mut tiers: Vec<Box<dyn ExtractionTier>> = vec![Box::new(FilenameTier)];
        if let Some(reader) = tag_reader {
            tiers.push(Box::new(TagTier::new(reader)));
        }
        Self {
            tiers,
            lookup: lookup.map(|l| LookupTier::new(l, lookup_timeout)),
        }
    }

    /// Whether an external lookup is configured.
    pub fn has_lookup(&self) -> bool {
        self.lookup.is_some()
    }

    /// Produces a best-effort record. Never fails.
    pub async fn extract(&self, file: &SourceFile) -> MetadataRecord {
        let mut record = self.extract_local(file).await;
        if let Some(lookup) = &self.lookup {
            lookup.apply(file, &mut record).await;
        }
        record_tiers(&record);
        record
    }

    /// Runs the local tiers, then always queries the catalog.
    ///
    /// Returns `None` when no lookup is configured.
    pub async fn search_candidate(&self, file: &SourceFile) -> Option<MetadataRecord> {
        let lookup = self.lookup.as_ref()?;
        let mut record = self.extract_local(file).await;
        if let Some(found) = lookup.query(file, &record).await {
            apply_match(found, &mut record);
        }
        Some(record)
    }

    async fn extract_local(&self, file: &SourceFile) -> MetadataRecord {
        let mut record = MetadataRecord::new();
        for tier in &self.tiers {
            tier.apply(file, &mut record).await;
        }
        record
    }
}

fn record_tiers(record: &MetadataRecord) {
    for tier in record.provenance.values() {
        metrics::FIELDS_RESOLVED
            .with_label_values(&[tier.as_str()])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Field;
    use crate::testing::{MockLookup, MockTagReader};

    fn file(name: &str) -> SourceFile {
        SourceFile::from_path(format!("/in/{}", name)).unwrap()
    }

    #[tokio::test]
    async fn test_filename_only() {
        let extractor = MetadataExtractor::new(None, None, Duration::from_secs(1));
        let record = extractor.extract(&file("Jane Doe - My Book.mp3")).await;

        assert_eq!(record.author.as_deref(), Some("Jane Doe"));
        assert_eq!(record.title.as_deref(), Some("My Book"));
        assert_eq!(record.source_of(Field::Title), Some(Tier::Filename));
    }

    #[tokio::test]
    async fn test_tags_fill_missing_fields_only() {
        let reader = MockTagReader::new();
        reader.set_tags(
            "/in/Jane Doe - My Book.mp3",
            EmbeddedTags {
                title: Some("Tagged Title".into()),
                artist: Some("Tagged Artist".into()),
                album: Some("The Series".into()),
                track: Some(3),
                disc: Some(2),
                year: None,
            },
        );
        let extractor =
            MetadataExtractor::new(Some(Arc::new(reader)), None, Duration::from_secs(1));

        let record = extractor.extract(&file("Jane Doe - My Book.mp3")).await;
        assert_eq!(record.title.as_deref(), Some("My Book"));
        assert_eq!(record.author.as_deref(), Some("Jane Doe"));
        assert_eq!(record.series.as_deref(), Some("The Series"));
        assert_eq!(record.track_number, Some(3));
        assert_eq!(record.disc_number, Some(2));
        assert_eq!(record.source_of(Field::TrackNumber), Some(Tier::EmbeddedTag));
    }

    #[tokio::test]
    async fn test_tag_failure_is_swallowed() {
        let reader = MockTagReader::new();
        reader.fail_for("/in/Jane Doe - My Book.mp3");
        let extractor =
            MetadataExtractor::new(Some(Arc::new(reader)), None, Duration::from_secs(1));

        let record = extractor.extract(&file("Jane Doe - My Book.mp3")).await;
        assert_eq!(record.title.as_deref(), Some("My Book"));
        assert!(record.track_number.is_none());
    }

    #[tokio::test]
    async fn test_lookup_does_not_overwrite_filename_fields() {
        let lookup = MockLookup::new();
        lookup
            .add_match(
                "My Book",
                BookMatch::new("Different Title", vec!["Someone Else".into()]),
            )
            .await;
        let lookup = Arc::new(lookup);
        let extractor = MetadataExtractor::new(
            None,
            Some(lookup.clone() as Arc<dyn BibliographicLookup>),
            Duration::from_secs(1),
        );

        let record = extractor.extract(&file("Jane Doe - My Book.mp3")).await;
        assert_eq!(record.author.as_deref(), Some("Jane Doe"));
        assert_eq!(record.title.as_deref(), Some("My Book"));
        // Both identity fields were known, so the catalog is never asked
        assert_eq!(lookup.query_count().await, 0);
    }

    #[tokio::test]
    async fn test_lookup_fills_missing_author_without_replacing_title() {
        let lookup = MockLookup::new();
        lookup
            .add_match(
                "Interlude",
                BookMatch::new("Interlude: A Novel", vec!["Jane Doe".into()]),
            )
            .await;
        let extractor = MetadataExtractor::new(
            None,
            Some(Arc::new(lookup) as Arc<dyn BibliographicLookup>),
            Duration::from_secs(1),
        );

        let record = extractor.extract(&file("Vol 2 - - Interlude.mp3")).await;
        assert_eq!(record.title.as_deref(), Some("Interlude"));
        assert_eq!(record.author.as_deref(), Some("Jane Doe"));
        assert_eq!(record.source_of(Field::Author), Some(Tier::ExternalLookup));
        assert_eq!(record.source_of(Field::Title), Some(Tier::Filename));
    }

    #[tokio::test]
    async fn test_lookup_uses_stem_when_no_title() {
        let lookup = MockLookup::new();
        lookup
            .add_match(
                "mysterybook",
                BookMatch::new("Mystery Book", vec!["A. Writer".into()]),
            )
            .await;
        let extractor = MetadataExtractor::new(
            None,
            Some(Arc::new(lookup) as Arc<dyn BibliographicLookup>),
            Duration::from_secs(1),
        );

        let record = extractor.extract(&file("mysterybook.mp3")).await;
        assert_eq!(record.title.as_deref(), Some("Mystery Book"));
        assert_eq!(record.author.as_deref(), Some("A. Writer"));
    }

    #[tokio::test]
    async fn test_lookup_error_degrades_to_no_match() {
        let lookup = MockLookup::new();
        lookup
            .set_next_error(LookupError::ApiError {
                status: 500,
                message: "boom".into(),
            })
            .await;
        let extractor = MetadataExtractor::new(
            None,
            Some(Arc::new(lookup) as Arc<dyn BibliographicLookup>),
            Duration::from_secs(1),
        );

        let record = extractor.extract(&file("untitled.mp3")).await;
        assert!(!record.has_title());
    }

    #[tokio::test]
    async fn test_lookup_timeout_degrades_to_no_match() {
        let lookup = MockLookup::new();
        lookup
            .add_match(
                "slow",
                BookMatch::new("Slow", vec!["Author".into()]),
            )
            .await;
        lookup.set_delay(Duration::from_millis(500)).await;
        let extractor = MetadataExtractor::new(
            None,
            Some(Arc::new(lookup) as Arc<dyn BibliographicLookup>),
            Duration::from_millis(20),
        );

        let record = extractor.extract(&file("slow.mp3")).await;
        assert!(!record.has_title());
    }

    #[tokio::test]
    async fn test_isbn_searched_first() {
        let lookup = MockLookup::new();
        lookup
            .add_isbn_match(
                "9781234567897",
                BookMatch::new("By Isbn", vec!["Isbn Author".into()]),
            )
            .await;
        let extractor = MetadataExtractor::new(
            None,
            Some(Arc::new(lookup) as Arc<dyn BibliographicLookup>),
            Duration::from_secs(1),
        );

        let record = extractor.extract(&file("9781234567897.m4b")).await;
        assert_eq!(record.isbn.as_deref(), Some("9781234567897"));
        assert_eq!(record.title.as_deref(), Some("By Isbn"));
        assert_eq!(record.author.as_deref(), Some("Isbn Author"));
    }

    #[tokio::test]
    async fn test_search_candidate_requires_lookup() {
        let extractor = MetadataExtractor::new(None, None, Duration::from_secs(1));
        assert!(!extractor.has_lookup());
        assert!(extractor.search_candidate(&file("x.mp3")).await.is_none());
    }
}
