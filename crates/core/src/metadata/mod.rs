//! Metadata model and the tiered resolution pipeline.

mod extractor;
mod filename;
mod types;

pub use extractor::{
    apply_match, ExtractionTier, FilenameTier, LookupTier, MetadataExtractor, TagTier,
};
pub use filename::{parse_filename, parse_isbn, FilenameMetadata};
pub use types::{
    parse_number, Field, FieldValue, MetadataRecord, Provenance, SourceFile, Tier,
};
