//! Step outcomes and terminal reporting.
//!
//! Each maintenance command records what happened at every step into a
//! [`Report`]. Fatal conditions are not outcomes: they surface as the `Err`
//! arm of the command's result and stop it immediately.

use colored::Colorize;
use std::fmt;

/// Result of a single non-fatal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The step did what it was asked to do.
    Success(String),
    /// The step could not complete; the command carries on.
    Warning(String),
    /// Plain informational line, such as a listed path.
    Info(String),
}

impl Outcome {
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Warning(m) | Self::Info(m) => m,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(m) => write!(f, "{} {}", "✓".green().bold(), m),
            Self::Warning(m) => write!(f, "{} {} {}", "⚠".yellow(), "Warning:".yellow().bold(), m),
            Self::Info(m) => write!(f, "  {}", m),
        }
    }
}

/// Ordered outcomes of one command.
#[derive(Debug, Default)]
pub struct Report {
    outcomes: Vec<Outcome>,
    echo: bool,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print every outcome to stdout as soon as it is recorded.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn record(&mut self, outcome: Outcome) {
        if self.echo {
            println!("{outcome}");
        }
        self.outcomes.push(outcome);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.record(Outcome::Success(message.into()));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(Outcome::Warning(message.into()));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Outcome::Info(message.into()));
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Messages of all warnings, in order.
    pub fn warnings(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_warning())
            .map(Outcome::message)
            .collect()
    }

    pub fn has_warnings(&self) -> bool {
        self.outcomes.iter().any(Outcome::is_warning)
    }
}
