use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audioshelf_core::{
    load_config, validate_config, BibliographicLookup, GoogleBooksClient, LoftyTags,
    OrganizerEngine, Registry,
};
use audioshelf_server::api::create_router;
use audioshelf_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("AUDIOSHELF_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Source directories: {:?}", config.organizer.source_dirs);
    info!("Destination root: {:?}", config.organizer.dest_root);
    info!("Workers: {}", config.organizer.workers);

    // Open the accepted/rejected logs and rebuild the pending set
    let registry = Arc::new(
        Registry::from_config(&config.registry).context("Failed to open registry logs")?,
    );
    info!(
        "Registry opened ({} files pending resolution)",
        registry.pending().len()
    );

    let tags = Arc::new(LoftyTags::new());
    let mut engine = OrganizerEngine::new(config.organizer.clone(), registry)
        .with_tag_reader(tags.clone())
        .with_tag_writer(tags);

    // Create catalog lookup if configured
    match &config.lookup {
        Some(lookup_config) => match GoogleBooksClient::new(lookup_config) {
            Ok(client) => {
                info!("Initializing Google Books lookup at {}", lookup_config.base_url);
                let lookup: Arc<dyn BibliographicLookup> = Arc::new(client);
                engine =
                    engine.with_lookup(lookup, Duration::from_secs(lookup_config.timeout_secs));
            }
            Err(e) => error!("Failed to create Google Books client: {}", e),
        },
        None => info!("No catalog lookup configured"),
    }

    let engine = Arc::new(engine);

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&engine)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if engine.state().is_active() {
        info!("Shutting down with a run in progress; rerun to pick up unplaced files");
    }
    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
