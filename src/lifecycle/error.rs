//! Startup failure types.

use std::backtrace::Backtrace;
use std::error::Error as _;
use thiserror::Error;

use crate::bot::BotError;
use crate::database::DatabaseError;
use crate::lifecycle::checkpoint::Step;

/// Process exit code used by every fail-fast path.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Why the startup sequence stopped.
///
/// Messages name the failing stage only; the underlying error is reachable
/// through `source()`.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Step 1 raised.
    #[error("Database initialization failed")]
    Database(#[source] DatabaseError),

    /// Step 2 raised.
    #[error("Bot construction failed")]
    BotConstruction(#[source] BotError),

    /// Step 2 produced no instance without raising.
    #[error("Bot construction produced no instance")]
    BotMissing,

    /// Step 3 raised.
    #[error("Bot session failed to start")]
    BotStart(#[source] BotError),

    /// `startup` was called on a lifecycle that already ran it.
    #[error("Startup already ran (state: {0})")]
    AlreadyStarted(crate::lifecycle::LifecycleState),
}

impl StartupError {
    /// Short category name shown in the fatal report.
    pub fn kind(&self) -> &'static str {
        match self {
            StartupError::Database(_) => "DatabaseError",
            StartupError::BotConstruction(_) => "BotConstructionError",
            StartupError::BotMissing => "BotMissing",
            StartupError::BotStart(_) => "BotStartError",
            StartupError::AlreadyStarted(_) => "AlreadyStarted",
        }
    }

    /// Sentinel failures carry no error value and so no trace.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, StartupError::BotMissing)
    }

    /// Only errors raised by a collaborator get a backtrace.
    fn is_raised(&self) -> bool {
        matches!(
            self,
            StartupError::Database(_) | StartupError::BotConstruction(_) | StartupError::BotStart(_)
        )
    }
}

/// A startup failure, attributed to the step that produced it.
///
/// `step` is `None` when no step ran, e.g. a repeated `startup` call.
#[derive(Debug)]
pub struct StartupFailure {
    pub step: Option<Step>,
    pub error: StartupError,
    backtrace: Option<Backtrace>,
}

impl StartupFailure {
    pub(crate) fn at_step(step: Step, error: StartupError) -> Self {
        let backtrace = error.is_raised().then(Backtrace::force_capture);
        Self {
            step: Some(step),
            error,
            backtrace,
        }
    }

    pub(crate) fn outside_sequence(error: StartupError) -> Self {
        Self {
            step: None,
            error,
            backtrace: None,
        }
    }

    /// Messages of the underlying error chain, outermost first, excluding
    /// the top-level error itself.
    pub fn causes(&self) -> Vec<String> {
        let mut causes = Vec::new();
        let mut source = self.error.source();
        while let Some(err) = source {
            causes.push(err.to_string());
            source = err.source();
        }
        causes
    }

    /// The error and its causes on one line.
    pub fn detail(&self) -> String {
        std::iter::once(self.error.to_string())
            .chain(self.causes())
            .collect::<Vec<_>>()
            .join(": ")
    }

    /// Captured at the point the failure was detected.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }
}

impl std::fmt::Display for StartupFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.step {
            Some(step) => write!(f, "step {}: {}", step, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for StartupFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
