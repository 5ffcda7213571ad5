//! Sequential console test driver.
//!
//! A run prints a start banner, executes its steps in order inside a single
//! error boundary, reports how it ended, and always prints the completion
//! banner. The first failing step ends the run; nothing is retried.

use std::fmt;
use std::io::Write;

use chrono::Local;

use crate::error::ApiError;

const RULE: &str = "==================================================";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// A response broke an expectation.
    Failed(String),
    /// The run broke for any other reason.
    Errored(String),
}

/// Writes human-readable progress for a sequence of API calls.
pub struct Driver<W: Write> {
    out: W,
    steps: usize,
}

impl<W: Write> Driver<W> {
    pub fn new(out: W) -> Self {
        Self { out, steps: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Announce the next operation.
    pub fn step(&mut self, description: &str) -> Result<(), ApiError> {
        if self.steps > 0 {
            writeln!(self.out)?;
        }
        self.steps += 1;
        writeln!(self.out, "{description}")?;
        Ok(())
    }

    /// Summarise the result of the current operation.
    pub fn report(&mut self, summary: &str) -> Result<(), ApiError> {
        writeln!(self.out, "{summary}")?;
        Ok(())
    }

    pub fn warn(&mut self, message: &str) -> Result<(), ApiError> {
        writeln!(self.out, "Warning: {message}")?;
        Ok(())
    }

    pub fn run<F>(&mut self, title: &str, steps: F) -> Outcome
    where
        F: FnOnce(&mut Self) -> Result<(), ApiError>,
    {
        self.steps = 0;
        self.line(format_args!("Starting {title} - {}", timestamp()));
        self.line(format_args!("{RULE}"));

        let outcome = match steps(self) {
            Ok(()) => {
                self.line(format_args!("\nAll tests passed!"));
                Outcome::Passed
            }
            Err(e) if e.is_assertion() => {
                self.line(format_args!("\nTest failed: {e}"));
                Outcome::Failed(e.to_string())
            }
            Err(e) => {
                self.line(format_args!("\nUnexpected error: {e}"));
                Outcome::Errored(e.to_string())
            }
        };

        self.line(format_args!("{RULE}"));
        self.line(format_args!("Finished - {}", timestamp()));
        tracing::debug!(title, ?outcome, "run finished");
        outcome
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{args}") {
            tracing::warn!(error = %e, "could not write driver output");
        }
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
