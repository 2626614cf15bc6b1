//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (accepted only after startup succeeded)
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → status handler: {"status": "Bot is running"}
//!
//! healthcheck binary
//!     → check.rs (GET the status endpoint, map the payload to an exit code)
//! ```

pub mod check;
pub mod server;

pub use check::{check_status, StatusCheckError};
pub use server::{HttpServer, StatusResponse, RUNNING_STATUS};
