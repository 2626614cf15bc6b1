//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (DATABASE_URI, BOT_TOKEN, PORT, ...)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::BotConfig;
pub use schema::DatabaseConfig;
pub use schema::LifecycleConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::ServerConfig;
