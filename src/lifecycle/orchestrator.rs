//! Startup/shutdown orchestration.
//!
//! # Responsibilities
//! - Run the 4-step startup sequence in strict order
//! - Checkpoint each step and attribute failures to it
//! - Own the bot session handle for the process lifetime
//! - Stop the session at most once, and only if it is connected
//!
//! # Design Decisions
//! - Fail fast: the first error ends startup; the caller decides to exit
//! - Steps run sequentially, never concurrently
//! - Shutdown errors are logged and reported, never propagated

use std::time::{Duration, Instant};

use crate::bot::{BotError, BotFactory, BotSession};
use crate::database::Database;
use crate::lifecycle::checkpoint::{Checkpoints, Step};
use crate::lifecycle::error::{StartupError, StartupFailure};
use crate::lifecycle::state::LifecycleState;
use crate::observability::metrics;

/// What the shutdown hook did.
#[derive(Debug)]
pub struct ShutdownReport {
    /// `stop` was invoked on the session.
    pub stop_attempted: bool,
    /// `stop` failed or timed out; shutdown continued regardless.
    pub error: Option<BotError>,
    /// State after the hook ran.
    pub state: LifecycleState,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }
}

/// Lifecycle context handed to the host's startup and shutdown hooks.
pub struct Lifecycle {
    database: Box<dyn Database>,
    bot_factory: Box<dyn BotFactory>,
    checkpoints: Checkpoints,
    session: Option<Box<dyn BotSession>>,
    state: LifecycleState,
    stop_timeout: Option<Duration>,
    shutdown_ran: bool,
}

impl Lifecycle {
    pub fn new(
        database: Box<dyn Database>,
        bot_factory: Box<dyn BotFactory>,
        checkpoints: Checkpoints,
    ) -> Self {
        Self {
            database,
            bot_factory,
            checkpoints,
            session: None,
            state: LifecycleState::NotStarted,
            stop_timeout: None,
            shutdown_ran: false,
        }
    }

    /// Bound the bot `stop` call during shutdown.
    pub fn with_stop_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether a session handle exists and reports connected.
    pub fn is_bot_connected(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_connected())
    }

    fn advance(&mut self, next: LifecycleState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal lifecycle transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "Lifecycle transition");
        self.state = next;
    }

    fn fail(&mut self, step: Step, error: StartupError, started: Instant) -> StartupFailure {
        metrics::record_step(step.name(), "failure", started);
        self.advance(LifecycleState::Failed);

        let failure = StartupFailure::at_step(step, error);
        if failure.error.is_sentinel() {
            self.checkpoints
                .failure(step, "Bot client construction returned no instance.");
        } else {
            self.checkpoints.failure(step, &failure.detail());
            self.checkpoints.fatal(&failure);
        }
        failure
    }

    /// Startup hook: run the sequence, ending in `Serving` on success.
    ///
    /// Never retries. On error the state is `Failed` and the caller must
    /// terminate the process after running [`Lifecycle::shutdown`].
    pub async fn startup(&mut self) -> Result<(), StartupFailure> {
        if self.state != LifecycleState::NotStarted {
            let error = StartupError::AlreadyStarted(self.state);
            tracing::error!(state = %self.state, "Startup hook invoked twice");
            return Err(StartupFailure::outside_sequence(error));
        }

        self.checkpoints.sequence_started();

        // Step 1
        let started = Instant::now();
        self.checkpoints.begin(Step::InitDatabase);
        if let Err(e) = self.database.init().await {
            return Err(self.fail(Step::InitDatabase, StartupError::Database(e), started));
        }
        self.checkpoints.success(Step::InitDatabase);
        metrics::record_step(Step::InitDatabase.name(), "success", started);
        self.advance(LifecycleState::DbReady);

        // Step 2
        let started = Instant::now();
        self.checkpoints.begin(Step::ConstructBot);
        let session = match self.bot_factory.build() {
            Ok(Some(session)) => session,
            Ok(None) => {
                return Err(self.fail(Step::ConstructBot, StartupError::BotMissing, started));
            }
            Err(e) => {
                return Err(self.fail(
                    Step::ConstructBot,
                    StartupError::BotConstruction(e),
                    started,
                ));
            }
        };
        self.session = Some(session);
        self.checkpoints.success(Step::ConstructBot);
        metrics::record_step(Step::ConstructBot.name(), "success", started);
        self.advance(LifecycleState::BotConstructed);

        // Step 3
        let started = Instant::now();
        self.checkpoints.begin(Step::StartBot);
        let start_result = match self.session.as_mut() {
            Some(session) => session.start().await,
            None => Err(BotError::NotConnected),
        };
        if let Err(e) = start_result {
            return Err(self.fail(Step::StartBot, StartupError::BotStart(e), started));
        }
        self.checkpoints.success(Step::StartBot);
        metrics::record_step(Step::StartBot.name(), "success", started);
        self.advance(LifecycleState::BotConnected);

        // Step 4
        let started = Instant::now();
        self.checkpoints.begin(Step::HandOver);
        self.checkpoints.sequence_complete();
        metrics::record_step(Step::HandOver.name(), "success", started);
        self.advance(LifecycleState::Serving);

        Ok(())
    }

    /// Shutdown hook: best-effort cleanup after serving ends or after a
    /// failed startup.
    ///
    /// Invokes `stop` at most once per lifetime, and only when a session
    /// exists and reports connected at this moment. Later calls are no-ops.
    pub async fn shutdown(&mut self) -> ShutdownReport {
        if self.shutdown_ran {
            tracing::debug!(state = %self.state, "Shutdown hook already ran");
            return ShutdownReport {
                stop_attempted: false,
                error: None,
                state: self.state,
            };
        }
        self.shutdown_ran = true;

        if self.state == LifecycleState::Serving {
            self.advance(LifecycleState::ShuttingDown);
        }

        let mut report = ShutdownReport {
            stop_attempted: false,
            error: None,
            state: self.state,
        };

        let connected = self.is_bot_connected();
        match self.session.take() {
            Some(mut session) if connected => {
                report.stop_attempted = true;
                self.checkpoints.note("Shutting down bot session...");

                let result = match self.stop_timeout {
                    Some(limit) => tokio::time::timeout(limit, session.stop())
                        .await
                        .unwrap_or(Err(BotError::StopTimeout(limit))),
                    None => session.stop().await,
                };

                match result {
                    Ok(()) => {
                        self.checkpoints.note("Bot session stopped.");
                        metrics::record_shutdown("stopped");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Bot session failed to stop cleanly");
                        self.checkpoints
                            .note(&format!("Bot session did not stop cleanly: {}", e));
                        metrics::record_shutdown("stop_failed");
                        report.error = Some(e);
                    }
                }
            }
            _ => {
                tracing::info!(state = %self.state, "No connected bot session to stop");
                metrics::record_shutdown("nothing_to_stop");
            }
        }

        if self.state == LifecycleState::ShuttingDown {
            self.advance(LifecycleState::Stopped);
        }
        report.state = self.state;

        tracing::info!(state = %self.state, "Shutdown hook finished");
        report
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("state", &self.state)
            .field("has_session", &self.session.is_some())
            .field("stop_timeout", &self.stop_timeout)
            .finish_non_exhaustive()
    }
}
