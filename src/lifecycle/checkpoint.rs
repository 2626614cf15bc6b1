//! Startup checkpoints.
//!
//! # Responsibilities
//! - Name the startup steps and their operator-facing messages
//! - Write one flushed line per checkpoint to the diagnostic sink
//! - Mirror every checkpoint as a structured tracing event
//! - Render the fatal-error block for raised startup failures
//!
//! # Design Decisions
//! - The sink is plain line-oriented text, flushed per line, so progress is
//!   visible even if the process is killed mid-step
//! - Write errors on the sink are logged, never propagated

use std::fmt;
use std::io::Write;

use crate::lifecycle::error::StartupFailure;

/// Number of steps in the startup sequence.
pub const TOTAL_STEPS: u8 = 4;

const FATAL_BAR: &str = "!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!";

/// One step of the startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    InitDatabase,
    ConstructBot,
    StartBot,
    HandOver,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::InitDatabase,
        Step::ConstructBot,
        Step::StartBot,
        Step::HandOver,
    ];

    pub fn number(self) -> u8 {
        match self {
            Step::InitDatabase => 1,
            Step::ConstructBot => 2,
            Step::StartBot => 3,
            Step::HandOver => 4,
        }
    }

    /// Stable identifier used for log fields and metric labels.
    pub fn name(self) -> &'static str {
        match self {
            Step::InitDatabase => "init_database",
            Step::ConstructBot => "construct_bot",
            Step::StartBot => "start_bot",
            Step::HandOver => "hand_over",
        }
    }

    fn action(self) -> &'static str {
        match self {
            Step::InitDatabase => "Initializing database connection...",
            Step::ConstructBot => "Constructing bot client...",
            Step::StartBot => "Starting bot session...",
            Step::HandOver => "Handing over to web server...",
        }
    }

    fn success(self) -> &'static str {
        match self {
            Step::InitDatabase => "Database connection appears stable.",
            Step::ConstructBot => "Bot client constructed.",
            Step::StartBot => "Bot session started. Bot should be online.",
            Step::HandOver => "Web server is in control.",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.number(), TOTAL_STEPS)
    }
}

/// Line-oriented diagnostic writer for the startup sequence.
pub struct Checkpoints {
    out: Box<dyn Write + Send>,
}

impl Checkpoints {
    /// Checkpoints on the process's standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    pub fn sequence_started(&mut self) {
        tracing::info!("Startup sequence started");
        self.line("");
        self.line("--- STARTING STARTUP SEQUENCE ---");
        self.line("");
    }

    pub fn begin(&mut self, step: Step) {
        tracing::info!(step = step.name(), number = step.number(), "Startup step begin");
        self.line(&format!("[STARTUP STEP {}] {}", step, step.action()));
    }

    pub fn success(&mut self, step: Step) {
        tracing::info!(step = step.name(), outcome = "success", "Startup step finished");
        self.line(&format!("[STARTUP STEP {}] SUCCESS: {}", step, step.success()));
    }

    pub fn failure(&mut self, step: Step, detail: &str) {
        tracing::error!(step = step.name(), outcome = "failure", detail, "Startup step failed");
        self.line(&format!("[STARTUP STEP {}] FAILURE: {}", step, detail));
    }

    pub fn sequence_complete(&mut self) {
        tracing::info!("Startup sequence complete");
        self.line("");
        self.line("--- STARTUP SEQUENCE COMPLETE: BOT IS RUNNING ---");
        self.line("");
    }

    /// Delimited report for a raised startup failure: kind, message, cause
    /// chain and backtrace.
    pub fn fatal(&mut self, failure: &StartupFailure) {
        tracing::error!(
            step = failure.step.map_or("none", Step::name),
            kind = failure.error.kind(),
            error = %failure.detail(),
            "Fatal error during startup"
        );

        self.line("");
        self.line("!!!!!!!!!!!!!!! A FATAL ERROR OCCURRED DURING STARTUP !!!!!!!!!!!!!!!");
        self.line("");
        match failure.step {
            Some(step) => self.line(&format!(
                "The failure occurred at step {} ({}).",
                step,
                step.name()
            )),
            None => self.line("The failure occurred outside the startup steps."),
        }
        self.line(&format!("Error Type: {}", failure.error.kind()));
        self.line(&format!("Error Details: {}", failure.error));

        let causes = failure.causes();
        if !causes.is_empty() {
            self.line("Caused by:");
            for (i, cause) in causes.iter().enumerate() {
                self.line(&format!("    {}: {}", i, cause));
            }
        }

        if let Some(backtrace) = failure.backtrace() {
            self.line("Stack backtrace:");
            for frame in backtrace.to_string().lines() {
                self.line(frame);
            }
        }

        self.line("");
        self.line(FATAL_BAR);
        self.line("");
    }

    /// Free-form lifecycle note (used by the shutdown hook).
    pub fn note(&mut self, text: &str) {
        self.line(text);
    }

    fn line(&mut self, text: &str) {
        let written = writeln!(self.out, "{}", text).and_then(|_| self.out.flush());
        if let Err(e) = written {
            tracing::warn!(error = %e, "Failed to write checkpoint line");
        }
    }
}

impl fmt::Debug for Checkpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkpoints").finish_non_exhaustive()
    }
}
