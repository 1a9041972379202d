use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub organizer: OrganizerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub lookup: Option<LookupConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    9977
}

/// How the title directory is named for books split across several parts.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartPolicyKind {
    /// Every book uses the bare title directory.
    None,
    /// Disc numbers above 1 get a `(Part N)` suffix on the title directory.
    #[default]
    DiscSuffix,
}

/// Organizer engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrganizerConfig {
    /// Directories scanned for audio files.
    #[serde(default)]
    pub source_dirs: Vec<PathBuf>,
    /// Root of the reorganized library.
    pub dest_root: PathBuf,
    /// Recognized extensions, without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Number of parallel workers.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Name of the directory holding the audio files inside a title directory.
    #[serde(default = "default_audio_subdir")]
    pub audio_subdir: String,
    /// Author directory used when no author could be resolved.
    #[serde(default = "default_unknown_author")]
    pub unknown_author: String,
    #[serde(default)]
    pub part_policy: PartPolicyKind,
    /// Copy a sibling `cover.jpg` into the title directory.
    #[serde(default = "default_true")]
    pub copy_cover_art: bool,
    /// Verify each copy with a SHA-256 checksum.
    #[serde(default)]
    pub verify_checksums: bool,
}

impl OrganizerConfig {
    /// Creates a config with defaults for everything except the paths.
    pub fn new(source_dirs: Vec<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            source_dirs,
            dest_root: dest_root.into(),
            extensions: default_extensions(),
            workers: default_workers(),
            audio_subdir: default_audio_subdir(),
            unknown_author: default_unknown_author(),
            part_policy: PartPolicyKind::default(),
            copy_cover_art: true,
            verify_checksums: false,
        }
    }

    /// Sets the number of workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the part policy.
    pub fn with_part_policy(mut self, policy: PartPolicyKind) -> Self {
        self.part_policy = policy;
        self
    }
}

fn default_extensions() -> Vec<String> {
    ["mp3", "m4b", "m4a", "mp4"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_workers() -> usize {
    4
}

fn default_audio_subdir() -> String {
    "audiotrack".to_string()
}

fn default_unknown_author() -> String {
    "Unknown Author".to_string()
}

fn default_true() -> bool {
    true
}

/// Registry log locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    #[serde(default = "default_accepted_log")]
    pub accepted_log: PathBuf,
    #[serde(default = "default_rejected_log")]
    pub rejected_log: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            accepted_log: default_accepted_log(),
            rejected_log: default_rejected_log(),
        }
    }
}

fn default_accepted_log() -> PathBuf {
    PathBuf::from("accepted_files.csv")
}

fn default_rejected_log() -> PathBuf {
    PathBuf::from("unidentifiable_files.csv")
}

/// Bibliographic lookup configuration (Google Books compatible)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    /// API credential
    pub api_key: String,
    /// Base URL (default: https://www.googleapis.com/books/v1)
    #[serde(default = "default_lookup_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_lookup_url() -> String {
    "https://www.googleapis.com/books/v1".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub organizer: OrganizerConfig,
    pub registry: RegistryConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<SanitizedLookupConfig>,
}

/// Sanitized lookup config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLookupConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            organizer: config.organizer.clone(),
            registry: config.registry.clone(),
            lookup: config.lookup.as_ref().map(|l| SanitizedLookupConfig {
                base_url: l.base_url.clone(),
                api_key_configured: !l.api_key.is_empty(),
                timeout_secs: l.timeout_secs,
            }),
        }
    }
}
