//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (orchestrator.rs):
//!     Init database → Construct bot → Start bot session → Hand over
//!     each step checkpointed (checkpoint.rs), state tracked (state.rs)
//!
//! Serving (host.rs):
//!     HTTP server runs until the shutdown signal fires
//!
//! Shutdown (orchestrator.rs, shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger → server drains
//!     → stop bot session if connected
//! ```
//!
//! # Design Decisions
//! - Ordered startup: database first, then bot, then listeners
//! - Fail fast: any startup error is fatal and the process exits non-zero
//! - The sequencing code returns typed failures; only `main` exits
//! - Shutdown is best-effort and runs after failed startups too

pub mod checkpoint;
pub mod error;
pub mod host;
pub mod orchestrator;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use checkpoint::{Checkpoints, Step};
pub use error::{StartupError, StartupFailure, FAILURE_EXIT_CODE};
pub use host::RunOutcome;
pub use orchestrator::{Lifecycle, ShutdownReport};
pub use shutdown::Shutdown;
pub use state::LifecycleState;
