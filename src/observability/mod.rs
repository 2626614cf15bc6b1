//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle and HTTP layers produce:
//!     → logging.rs (structured log events, stderr)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
