// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reporter: a fan-out of output strategies.

use crate::{
    errors::WriteEventError,
    reporter::{DisplayStrategy, TeamCityStrategy, events::ReportEvent},
};
use debug_ignore::DebugIgnore;
use std::fmt;
use tracing::error;

/// Standard output destination for the reporter.
///
/// This is usually the terminal, but can be an in-memory buffer for tests.
/// Output goes to stdout rather than stderr because TeamCity only scans a
/// build's stdout for service messages.
pub enum ReporterOutput<'a> {
    /// Produce output on standard output.
    Stdout,

    /// Write output to a buffer.
    Buffer(&'a mut Vec<u8>),
}

/// A formatter for one observable report event.
///
/// Strategies are side-effecting writers. A write failure is returned as an
/// error value for the caller to log and swallow; strategies themselves must
/// not panic, since losing a display line must never abort the test run.
pub trait OutputStrategy: Send {
    /// Writes a report event to this strategy's sink.
    fn write_event(&mut self, event: &ReportEvent<'_>) -> Result<(), WriteEventError>;
}

/// Reporter builder.
///
/// Consumes the configuration surface (colorize, CI annotations) and builds
/// the strategy fan-out.
#[derive(Clone, Debug, Default)]
pub struct ReporterBuilder {
    should_colorize: bool,
    teamcity: bool,
}

impl ReporterBuilder {
    /// Set to true if the reporter should colorize output.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Set to true to emit TeamCity service messages around spec boundaries.
    pub fn set_teamcity(&mut self, teamcity: bool) -> &mut Self {
        self.teamcity = teamcity;
        self
    }

    /// Creates a new reporter writing to the given output.
    pub fn build<'a>(&self, output: ReporterOutput<'a>) -> Reporter<'a> {
        let displayer = DisplayStrategy::new(output, self.should_colorize);
        // The TeamCity wrapper with the flag off is exactly the plain
        // strategy, so there is always one entry here to start with.
        let strategy = TeamCityStrategy::new(displayer, self.teamcity);
        Reporter {
            strategies: DebugIgnore(vec![Box::new(strategy)]),
        }
    }
}

/// Reports events to every configured output strategy.
///
/// Strategies are invoked synchronously, in registration order, for every
/// event. A failing strategy is logged and skipped for that event; it never
/// stops the others or the run.
#[derive(Debug)]
pub struct Reporter<'a> {
    strategies: DebugIgnore<Vec<Box<dyn OutputStrategy + 'a>>>,
}

impl<'a> Reporter<'a> {
    /// Adds another output strategy to the fan-out.
    pub fn add_strategy(&mut self, strategy: Box<dyn OutputStrategy + 'a>) -> &mut Self {
        self.strategies.push(strategy);
        self
    }

    /// Reports an event to all strategies, swallowing individual failures.
    pub fn report_event(&mut self, event: &ReportEvent<'_>) {
        for strategy in self.strategies.iter_mut() {
            if let Err(err) = strategy.write_event(event) {
                error!("failed to write report event: {err}");
            }
        }
    }
}

impl fmt::Debug for ReporterOutput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "Stdout"),
            Self::Buffer(_) => write!(f, "Buffer(..)"),
        }
    }
}
