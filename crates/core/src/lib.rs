pub mod config;
pub mod dedup;
pub mod engine;
pub mod lookup;
pub mod metadata;
pub mod metrics;
pub mod placer;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod tags;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LookupConfig,
    OrganizerConfig, PartPolicyKind, RegistryConfig, SanitizedConfig, ServerConfig,
};
pub use dedup::{ClaimOutcome, DedupGuard};
pub use engine::{
    EngineError, EngineStatus, FileFailure, ManualMetadata, OrganizerEngine, RunState, RunSummary,
};
pub use lookup::{BibliographicLookup, BookMatch, GoogleBooksClient, LookupError};
pub use metadata::{Field, MetadataExtractor, MetadataRecord, SourceFile, Tier};
pub use placer::{FilePlacement, FsPlacer, PlacedFile, Placer, PlacerError};
pub use progress::{ProgressState, ProgressTracker, WorkerProgress};
pub use registry::{
    AcceptedEntry, CsvRegistryStore, Registry, RegistryError, RegistryStore, RejectReason,
    RejectedEntry,
};
pub use resolver::{DestinationPath, PartPolicy, PathResolver};
pub use tags::{EmbeddedTags, LoftyTags, TagError, TagReader, TagUpdate, TagWriter};
