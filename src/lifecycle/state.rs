//! Lifecycle state machine.
//!
//! # States
//! ```text
//! NotStarted → DbReady → BotConstructed → BotConnected → Serving
//!     → ShuttingDown → Stopped
//!
//! Failed: reachable from any state before Serving, absorbing.
//! ```
//!
//! # Design Decisions
//! - Transitions only move forward; no retries, no way back
//! - Shutdown may also run from Failed (best-effort cleanup) but the state
//!   stays Failed

use std::fmt;

/// Where the host process is in its startup/shutdown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    NotStarted,
    DbReady,
    BotConstructed,
    BotConnected,
    Serving,
    ShuttingDown,
    Stopped,
    Failed,
}

impl LifecycleState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: LifecycleState) -> bool {
        use LifecycleState::{
            BotConnected, BotConstructed, DbReady, Failed, NotStarted, Serving, ShuttingDown,
            Stopped,
        };

        matches!(
            (self, next),
            (NotStarted, DbReady)
                | (DbReady, BotConstructed)
                | (BotConstructed, BotConnected)
                | (BotConnected, Serving)
                | (Serving, ShuttingDown)
                | (ShuttingDown, Stopped)
                | (NotStarted | DbReady | BotConstructed | BotConnected, Failed)
        )
    }

    /// No further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Stopped | LifecycleState::Failed)
    }

    /// Startup has not yet reached the serving phase and has not failed.
    pub fn is_starting(self) -> bool {
        matches!(
            self,
            LifecycleState::NotStarted
                | LifecycleState::DbReady
                | LifecycleState::BotConstructed
                | LifecycleState::BotConnected
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::NotStarted => "not_started",
            LifecycleState::DbReady => "db_ready",
            LifecycleState::BotConstructed => "bot_constructed",
            LifecycleState::BotConnected => "bot_connected",
            LifecycleState::Serving => "serving",
            LifecycleState::ShuttingDown => "shutting_down",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Failed => "failed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
