//! Testing utilities and deterministic fakes for the engine's capabilities.
//!
//! # Example
//!
//! ```rust,ignore
//! use audioshelf_core::testing::{MockLookup, MockTagReader, MemoryRegistryStore};
//!
//! let lookup = MockLookup::new();
//! lookup.add_match("my book", fixtures::book_match("My Book", "Jane Doe")).await;
//!
//! let registry = Registry::open(Arc::new(MemoryRegistryStore::new()))?;
//! // Build an OrganizerEngine with .with_lookup(...)
//! ```

mod memory_registry;
mod mock_lookup;
mod mock_placer;
mod mock_tags;

pub use memory_registry::MemoryRegistryStore;
pub use mock_lookup::{MockLookup, RecordedLookupQuery};
pub use mock_placer::{MockPlacer, RecordedPlacement};
pub use mock_tags::{MockTagReader, MockTagWriter};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::lookup::BookMatch;
    use crate::tags::EmbeddedTags;

    /// A lookup match with one author.
    pub fn book_match(title: &str, author: &str) -> BookMatch {
        BookMatch::new(title, vec![author.to_string()])
    }

    /// Embedded tags carrying only disc and track numbers.
    pub fn track_tags(disc: u32, track: u32) -> EmbeddedTags {
        EmbeddedTags {
            disc: Some(disc),
            track: Some(track),
            ..Default::default()
        }
    }

    /// Writes a small fake audio file, creating parent directories.
    pub fn write_audio(dir: &Path, relative: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture dir");
        }
        std::fs::write(&path, format!("audio:{}", relative)).expect("write fixture file");
        path
    }
}
