// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by multinode-reporter.

use crate::reporter::{NodeIndex, SpecName};
use std::time::Duration;
use thiserror::Error;

/// An error that occurs while writing a report event.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing the event to the provided output.
    #[error("error writing to output")]
    Io(#[source] std::io::Error),
}

/// An event arrived outside the run/spec lifecycle it is valid in.
///
/// Protocol faults are logged and dropped by the sink. They never abort the
/// run; at worst the final report under-reports the affected spec.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ProtocolFault {
    /// A spec began while another spec was still open.
    #[error("spec {begun} began while spec {open} was still open")]
    SpecStillOpen {
        /// The spec that tried to begin.
        begun: SpecName,

        /// The spec that was still open.
        open: SpecName,
    },

    /// A node-scoped event referenced a node that was never declared for the
    /// open spec.
    #[error("event for node {index} arrived, but that node was never declared")]
    UndeclaredNode {
        /// The undeclared node index.
        index: NodeIndex,
    },

    /// A spec-scoped event arrived while no spec was open.
    #[error("no spec is open")]
    NoOpenSpec,

    /// A run-scoped event arrived after the run had already finished.
    #[error("the test run has already finished")]
    RunAlreadyFinished,
}

/// An error that occurs while waiting for the sink to confirm the end of a
/// test run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EndRunError {
    /// The sink did not confirm the end of the run within the caller-supplied
    /// timeout.
    ///
    /// The sink may still finish reporting later; this is a warning state,
    /// not a lost run.
    #[error("end of run not confirmed within {timeout:?}")]
    Unconfirmed {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The sink exited before confirming the end of the run.
    #[error("the message sink was closed before confirming the end of the run")]
    SinkClosed,
}
