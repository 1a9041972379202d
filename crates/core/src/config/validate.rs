use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one worker and one extension
/// - Destination root is not inside a source directory
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.organizer.workers == 0 {
        return Err(ConfigError::ValidationError(
            "organizer.workers must be at least 1".to_string(),
        ));
    }

    if config.organizer.extensions.is_empty() {
        return Err(ConfigError::ValidationError(
            "organizer.extensions cannot be empty".to_string(),
        ));
    }

    if config.organizer.audio_subdir.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "organizer.audio_subdir cannot be empty".to_string(),
        ));
    }

    // A destination inside a source dir would be rescanned on the next run
    if let Some(source) =
        source_containing(&config.organizer.dest_root, &config.organizer.source_dirs)
    {
        return Err(ConfigError::ValidationError(format!(
            "organizer.dest_root {} is inside source dir {}",
            config.organizer.dest_root.display(),
            source.display()
        )));
    }

    if let Some(lookup) = &config.lookup {
        if lookup.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "lookup.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}

/// The source directory that contains `dest_root`, if any. Placing into a
/// source tree would make the next scan pick up the copies.
pub fn source_containing<'a>(dest_root: &Path, source_dirs: &'a [PathBuf]) -> Option<&'a PathBuf> {
    source_dirs.iter().find(|s| dest_root.starts_with(s))
}
