// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TeamCity annotations layered over the plain rendering.

use crate::{
    errors::WriteEventError,
    reporter::{
        DisplayStrategy, OutputStrategy,
        events::{ReportEvent, ReportEventKind},
    },
};
use quick_teamcity::ServiceMessage;
use std::fmt;

/// Wraps a [`DisplayStrategy`], bracketing spec boundaries with TeamCity
/// service messages.
///
/// With the flag disabled this behaves identically to the inner strategy.
/// The markers share the inner strategy's output so they interleave
/// correctly with the plain lines TeamCity scans past.
pub struct TeamCityStrategy<'a> {
    inner: DisplayStrategy<'a>,
    enabled: bool,
}

impl<'a> TeamCityStrategy<'a> {
    /// Creates a new TeamCity strategy around the given display strategy.
    pub fn new(inner: DisplayStrategy<'a>, enabled: bool) -> Self {
        Self { inner, enabled }
    }
}

impl OutputStrategy for TeamCityStrategy<'_> {
    fn write_event(&mut self, event: &ReportEvent<'_>) -> Result<(), WriteEventError> {
        if !self.enabled {
            return self.inner.write_event(event);
        }

        match &event.kind {
            ReportEventKind::SpecStarted { name, .. } => {
                let started = ServiceMessage::test_started(name.to_string());
                self.inner.write_line(&started.to_string())?;
                self.inner.write_event(event)
            }
            ReportEventKind::SpecFinished { fact } => {
                self.inner.write_event(event)?;
                let name = fact.name().to_string();
                if !fact.passed() {
                    let failed_count = fact.nodes().filter(|node| !node.is_passed()).count();
                    let mut failed = ServiceMessage::test_failed(name.clone());
                    failed.attr(
                        "message",
                        format!("{failed_count} of {} nodes failed", fact.node_count()),
                    );
                    self.inner.write_line(&failed.to_string())?;
                }
                let mut finished = ServiceMessage::test_finished(name);
                finished.attr(
                    "duration",
                    fact.elapsed().unwrap_or_default().as_millis().to_string(),
                );
                self.inner.write_line(&finished.to_string())
            }
            _ => self.inner.write_event(event),
        }
    }
}

impl fmt::Debug for TeamCityStrategy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeamCityStrategy")
            .field("inner", &self.inner)
            .field("enabled", &self.enabled)
            .finish()
    }
}
