//! Hosting glue: brackets the HTTP server with the lifecycle hooks.
//!
//! ```text
//! startup hook ──ok──▶ bind ──ok──▶ serve until shutdown signal ──▶ shutdown hook ──▶ Stopped
//!      │                 │
//!      │                 └─err──▶ shutdown hook ──▶ ServerFailed
//!      └─err──▶ shutdown hook (best-effort) ──▶ StartupFailed
//! ```
//!
//! Nothing listens on the bind address until startup has succeeded, so a
//! client can never connect to a half-started process.

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::http::HttpServer;
use crate::lifecycle::error::{StartupFailure, FAILURE_EXIT_CODE};
use crate::lifecycle::orchestrator::{Lifecycle, ShutdownReport};

/// How a hosted run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Served until the shutdown signal, then cleaned up.
    Stopped(ShutdownReport),
    /// Startup failed; the server never accepted a connection.
    StartupFailed {
        failure: StartupFailure,
        cleanup: ShutdownReport,
    },
    /// Binding or serving failed after a successful startup.
    ServerFailed {
        error: std::io::Error,
        cleanup: ShutdownReport,
    },
}

impl RunOutcome {
    /// Process exit code for this outcome.
    ///
    /// Shutdown-phase errors are logged, not escalated: a run that served
    /// and then failed to stop the bot still exits 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Stopped(_) => 0,
            RunOutcome::StartupFailed { .. } | RunOutcome::ServerFailed { .. } => FAILURE_EXIT_CODE,
        }
    }

    pub fn cleanup(&self) -> &ShutdownReport {
        match self {
            RunOutcome::Stopped(cleanup)
            | RunOutcome::StartupFailed { cleanup, .. }
            | RunOutcome::ServerFailed { cleanup, .. } => cleanup,
        }
    }
}

/// Run startup, bind `bind_address` and serve until `shutdown` fires, then
/// run the shutdown hook.
pub async fn run(
    lifecycle: &mut Lifecycle,
    server: HttpServer,
    bind_address: &str,
    shutdown: broadcast::Receiver<()>,
) -> RunOutcome {
    if let Err(failure) = lifecycle.startup().await {
        let cleanup = lifecycle.shutdown().await;
        return RunOutcome::StartupFailed { failure, cleanup };
    }

    let listener = match TcpListener::bind(bind_address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(bind_address, error = %error, "Failed to bind listener");
            let cleanup = lifecycle.shutdown().await;
            return RunOutcome::ServerFailed { error, cleanup };
        }
    };

    let served = server.run(listener, shutdown).await;
    let cleanup = lifecycle.shutdown().await;

    match served {
        Ok(()) => RunOutcome::Stopped(cleanup),
        Err(error) => {
            tracing::error!(error = %error, "HTTP server failed");
            RunOutcome::ServerFailed { error, cleanup }
        }
    }
}
