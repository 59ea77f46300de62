//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database, stub job board
//! and a fast worker pool.

use super::constants::*;
use super::fixtures::{create_test_db_with_users, StubJobBoard};
use smart_hunter_server::board::JobBoard;
use smart_hunter_server::server::server::make_app;
use smart_hunter_server::server::{RequestsLoggingLevel, ServerConfig};
use smart_hunter_server::store::FullStore;
use smart_hunter_server::{MatchWorkerPool, MatcherSettings};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Test server instance with isolated database and stub job board
///
/// When dropped, the server gracefully shuts down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store for direct database access in tests
    pub store: Arc<dyn FullStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown: CancellationToken,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with a working stub board.
    pub async fn spawn() -> Self {
        Self::spawn_with_board(Arc::new(StubJobBoard { fail: false })).await
    }

    /// Spawns a server whose job board fails every call, for outage tests.
    pub async fn spawn_with_failing_board() -> Self {
        Self::spawn_with_board(Arc::new(StubJobBoard { fail: true })).await
    }

    async fn spawn_with_board(job_board: Arc<dyn JobBoard>) -> Self {
        let (temp_db_dir, store) =
            create_test_db_with_users().expect("Failed to create test database");
        let store: Arc<dyn FullStore> = store;

        // Fast workers so match tests finish promptly
        let matcher_settings = MatcherSettings {
            analysis_delay: Duration::from_millis(TEST_ANALYSIS_DELAY_MS),
            ..MatcherSettings::default()
        };
        let shutdown = CancellationToken::new();
        let (matcher, _worker_pool) = MatchWorkerPool::start(matcher_settings, shutdown.clone());

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            ..ServerConfig::default()
        };

        let app = make_app(config, store.clone(), job_board, matcher).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            _temp_db_dir: temp_db_dir,
            _shutdown: shutdown,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        self._shutdown.cancel();
        // TempDir will be cleaned up automatically
    }
}
