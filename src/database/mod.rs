//! Database connectivity subsystem.
//!
//! # Data Flow
//! ```text
//! DATABASE_URI
//!     → probe.rs (parse URI, resolve host, open TCP connection)
//!     → startup step 1 succeeds or fails with DatabaseError
//! ```
//!
//! # Design Decisions
//! - The lifecycle only needs "is the database reachable"; drivers stay
//!   behind the `Database` trait
//! - No retries: the first failure is reported to the startup sequence

pub mod probe;

use async_trait::async_trait;
use thiserror::Error;

pub use probe::ConnectivityProbe;

/// Errors raised while establishing database connectivity.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection string does not parse.
    #[error("Invalid database URI: {0}")]
    InvalidUri(String),

    /// Connection string has no host component.
    #[error("Database URI has no host")]
    MissingHost,

    /// No explicit port and no well-known default for the scheme.
    #[error("No port given and no default known for scheme '{0}'")]
    UnknownPort(String),

    /// Host name could not be resolved.
    #[error("Failed to resolve {host}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// Every resolved address refused or failed the connection.
    #[error("Database at {address} is unreachable")]
    Unreachable {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Database initialization as seen by the startup sequence.
#[async_trait]
pub trait Database: Send + Sync {
    /// Establish connectivity. Must complete before the bot is constructed.
    async fn init(&self) -> Result<(), DatabaseError>;
}
