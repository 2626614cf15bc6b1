//! Bot session subsystem.
//!
//! # Data Flow
//! ```text
//! BOT_TOKEN
//!     → BotFactory::build (None when unconfigured)
//!     → BotSession::start (establish the live session)
//!     → ... serving ...
//!     → BotSession::stop (only if is_connected)
//! ```
//!
//! # Design Decisions
//! - Construction distinguishes "misconfigured" (`Ok(None)`) from errors
//! - The session owns its own connected flag; the lifecycle only reads it

pub mod telegram;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use telegram::{BotIdentity, TelegramBotClient, TelegramBotFactory};

/// Errors raised by bot construction and session operations.
#[derive(Debug, Error)]
pub enum BotError {
    /// Token does not have the `<id>:<secret>` shape.
    #[error("Invalid bot token")]
    InvalidToken,

    /// API base URL does not parse.
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Transport-level failure talking to the API.
    #[error("Bot API request failed")]
    Http(#[from] reqwest::Error),

    /// The API answered but refused the request.
    #[error("Bot API rejected request: {0}")]
    Rejected(String),

    /// Operation requires a live session.
    #[error("Bot session is not connected")]
    NotConnected,

    /// Operation requires a session that is not yet live.
    #[error("Bot session is already connected")]
    AlreadyConnected,

    /// Stop did not finish within the configured bound.
    #[error("Bot session stop timed out after {0:?}")]
    StopTimeout(Duration),
}

/// A live connection to the chat platform.
#[async_trait]
pub trait BotSession: Send {
    /// Establish the live session.
    async fn start(&mut self) -> Result<(), BotError>;

    /// Whether the session is currently live.
    fn is_connected(&self) -> bool;

    /// Tear the session down gracefully.
    async fn stop(&mut self) -> Result<(), BotError>;
}

/// Builds bot sessions from configuration.
pub trait BotFactory: Send + Sync {
    /// `Ok(None)` means construction produced no usable instance.
    fn build(&self) -> Result<Option<Box<dyn BotSession>>, BotError>;
}
