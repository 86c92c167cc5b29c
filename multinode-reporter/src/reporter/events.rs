// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events emitted towards output strategies.
//!
//! The aggregation engine turns inbound run events into [`ReportEvent`]s,
//! stamping each one with its own clocks. Strategies only ever see these.

use crate::reporter::{FactData, TestRunTree};
use chrono::{DateTime, Local};
use std::{fmt, time::Duration};

/// The index of one worker node within a spec.
///
/// Node indices are assigned by the orchestrator and are unique within a
/// spec.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeIndex(
    /// The raw index value.
    pub u32,
);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity of a spec: the test class and method being run across nodes.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SpecName {
    /// The name of the type the spec is defined on.
    pub type_name: String,

    /// The name of the spec method.
    pub method_name: String,
}

impl SpecName {
    /// Creates a new spec name.
    pub fn new(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
        }
    }
}

impl fmt::Display for SpecName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.method_name)
    }
}

/// A node declared to participate in a spec, supplied by the orchestrator at
/// spec start.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeclaredNode {
    /// The node's index.
    pub index: NodeIndex,

    /// The node's role label, e.g. `"seed"` or `"client"`.
    pub role: String,
}

impl DeclaredNode {
    /// Creates a new declared node.
    pub fn new(index: NodeIndex, role: impl Into<String>) -> Self {
        Self {
            index,
            role: role.into(),
        }
    }
}

/// The severity of a runner-level log message.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    /// Debug chatter.
    Debug,

    /// Informational messages.
    Info,

    /// Warnings.
    Warning,

    /// Errors.
    Error,
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            Severity::Error
        } else if level == tracing::Level::WARN {
            Severity::Warning
        } else if level == tracing::Level::INFO {
            Severity::Info
        } else {
            // TRACE folds into Debug.
            Severity::Debug
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

/// A report event.
///
/// Report events are produced by the
/// [`RunAggregator`](crate::reporter::RunAggregator) and consumed by
/// [`OutputStrategy`](crate::reporter::OutputStrategy) implementations.
#[derive(Clone, Debug)]
pub struct ReportEvent<'a> {
    /// The time at which the event was generated.
    pub timestamp: DateTime<Local>,

    /// The amount of time elapsed since the start of the test run.
    pub elapsed: Duration,

    /// The kind of report event this is.
    pub kind: ReportEventKind<'a>,
}

/// The kind of report event this is.
///
/// Forms part of [`ReportEvent`].
#[derive(Clone, Debug)]
pub enum ReportEventKind<'a> {
    /// A spec started running across its declared nodes.
    SpecStarted {
        /// The name of the spec.
        name: SpecName,

        /// The number of nodes the spec runs on.
        node_count: usize,
    },

    /// A node produced a fragment of log output.
    NodeLine {
        /// The node's index.
        index: NodeIndex,

        /// The node's role label.
        role: String,

        /// The log line produced by the node.
        line: String,
    },

    /// The test runner itself produced a log message.
    RunnerMessage {
        /// The severity of the message.
        severity: Severity,

        /// The message text.
        message: String,
    },

    /// A node reported that it passed the current spec.
    NodePassed {
        /// The node's index.
        index: NodeIndex,

        /// The node's role label.
        role: String,

        /// The diagnostic message accompanying the result.
        message: String,
    },

    /// A node reported that it failed the current spec.
    NodeFailed {
        /// The node's index.
        index: NodeIndex,

        /// The node's role label.
        role: String,

        /// The diagnostic message accompanying the result.
        message: String,
    },

    /// A spec finished; carries its finalized results.
    SpecFinished {
        /// The finalized results for the spec.
        fact: &'a FactData,
    },

    /// The run finished; carries the finalized run tree.
    RunFinished {
        /// The finalized results for the whole run.
        tree: &'a TestRunTree,
    },
}
