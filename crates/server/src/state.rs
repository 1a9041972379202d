use std::sync::Arc;

use audioshelf_core::{Config, OrganizerEngine, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    engine: Arc<OrganizerEngine>,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<OrganizerEngine>) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn engine(&self) -> &Arc<OrganizerEngine> {
        &self.engine
    }
}
