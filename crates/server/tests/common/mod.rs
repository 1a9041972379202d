//! Common test utilities for driving the router in-process.
//!
//! The fixture wires a real engine over temp directories with the
//! deterministic tag reader and lookup from `audioshelf_core::testing`.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use audioshelf_core::{
    testing::{MockLookup, MockTagReader},
    Config, OrganizerConfig, OrganizerEngine, Registry, RegistryConfig, ServerConfig,
};
use audioshelf_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use audioshelf_core::testing::fixtures;

/// Test fixture with an in-process router and controllable collaborators.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The engine behind the router
    pub engine: Arc<OrganizerEngine>,
    /// Canned embedded tags
    pub tags: Arc<MockTagReader>,
    /// Canned catalog matches (only wired when lookup is enabled)
    pub lookup: Arc<MockLookup>,
    /// Temporary directory holding sources, destination and logs
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Knobs for building a fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub workers: usize,
    pub enable_lookup: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            enable_lookup: true,
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default collaborators.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("in");
        let dest = temp_dir.path().join("out");
        std::fs::create_dir_all(&source).expect("Failed to create source dir");

        let organizer =
            OrganizerConfig::new(vec![source], dest).with_workers(test_config.workers);
        let config = Config {
            organizer: organizer.clone(),
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            registry: RegistryConfig {
                accepted_log: temp_dir.path().join("logs/accepted.csv"),
                rejected_log: temp_dir.path().join("logs/rejected.csv"),
            },
            lookup: None,
        };

        let registry =
            Arc::new(Registry::from_config(&config.registry).expect("Failed to open registry"));
        let tags = Arc::new(MockTagReader::new());
        let lookup = Arc::new(MockLookup::new());

        let mut engine = OrganizerEngine::new(organizer, registry).with_tag_reader(tags.clone());
        if test_config.enable_lookup {
            engine = engine.with_lookup(lookup.clone(), Duration::from_secs(5));
        }
        let engine = Arc::new(engine);

        let state = Arc::new(AppState::new(config, Arc::clone(&engine)));
        let router = create_router(state);

        Self {
            router,
            engine,
            tags,
            lookup,
            temp_dir,
        }
    }

    pub fn source(&self) -> PathBuf {
        self.temp_dir.path().join("in")
    }

    pub fn dest(&self) -> PathBuf {
        self.temp_dir.path().join("out")
    }

    /// Write a fake audio file under the source tree.
    pub fn add_file(&self, relative: &str) -> PathBuf {
        fixtures::write_audio(&self.source(), relative)
    }

    /// Wait for the current run to finish.
    pub async fn wait_for_run(&self) {
        tokio::time::timeout(Duration::from_secs(10), self.engine.wait())
            .await
            .expect("Run did not finish");
    }

    /// Make a GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Request::builder().method("GET").uri(uri).body(Body::empty()))
            .await
    }

    /// Make a POST request with a JSON body.
    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
        )
        .await
    }

    /// Make a POST request without a body.
    pub async fn post_empty(&self, uri: &str) -> TestResponse {
        self.request(Request::builder().method("POST").uri(uri).body(Body::empty()))
            .await
    }

    async fn request(&self, request: axum::http::Result<Request<Body>>) -> TestResponse {
        let request = request.expect("Failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }
}
