// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message sink: the single consumer of a run's event stream.
//!
//! Producers send [`RunEvent`]s through a cloneable [`SinkHandle`] without
//! ever blocking; [`MessageSink::run`] drains the shared inbox strictly in
//! receipt order, so aggregate state is only ever touched by one task and
//! needs no locking. The [`SinkHandle::end_run`] barrier resolves only after
//! the run summary has been reported, which FIFO draining extends to every
//! event sent before it.

use crate::{
    errors::EndRunError,
    reporter::{DeclaredNode, NodeIndex, Reporter, RunAggregator, Severity, SpecName, TestRunTree},
};
use std::time::Duration;
use tokio::sync::{
    mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    oneshot,
};
use tracing::warn;

/// An inbound event for the message sink.
#[derive(Debug)]
pub enum RunEvent {
    /// A spec started running on the given nodes.
    SpecStarted {
        /// The name of the spec.
        name: SpecName,

        /// The nodes declared to run the spec.
        nodes: Vec<DeclaredNode>,
    },

    /// A node produced a fragment of log output.
    NodeLine {
        /// The node's index.
        index: NodeIndex,

        /// The log line.
        line: String,
    },

    /// The test runner itself produced a log message.
    RunnerMessage {
        /// The severity of the message.
        severity: Severity,

        /// The message text.
        message: String,
    },

    /// A node reported completion of the current spec.
    NodeFinished {
        /// The node's index.
        index: NodeIndex,

        /// The node's role label.
        role: String,

        /// Whether the node passed.
        passed: bool,

        /// The diagnostic message accompanying the result.
        message: String,
    },

    /// The current spec finished.
    SpecFinished,

    /// The run finished. Carries the shutdown barrier's reply path.
    RunFinished {
        /// Acknowledged with the finalized tree once the run summary has
        /// been reported.
        ack: oneshot::Sender<TestRunTree>,
    },
}

/// The consuming half of the event stream.
///
/// Created together with its [`SinkHandle`]; [`run`](Self::run) must be
/// polled for events to be processed.
#[derive(Debug)]
pub struct MessageSink<'a> {
    receiver: UnboundedReceiver<RunEvent>,
    reporter: Reporter<'a>,
    aggregator: RunAggregator,
}

impl<'a> MessageSink<'a> {
    /// Creates a new message sink reporting through the given reporter,
    /// along with a handle for producers.
    pub fn new(reporter: Reporter<'a>) -> (Self, SinkHandle) {
        let (sender, receiver) = unbounded_channel();
        let sink = Self {
            receiver,
            reporter,
            aggregator: RunAggregator::new(),
        };
        (sink, SinkHandle { sender })
    }

    /// Drains the inbox until every handle has been dropped, then returns
    /// the run tree.
    ///
    /// Events are processed strictly one at a time, in receipt order.
    /// Events arriving after the run has finished are drained too, so late
    /// producers only cost a logged fault, never a stuck sender.
    pub async fn run(mut self) -> TestRunTree {
        while let Some(event) = self.receiver.recv().await {
            self.handle_event(event);
        }
        self.aggregator.into_tree()
    }

    fn handle_event(&mut self, event: RunEvent) {
        match event {
            RunEvent::SpecStarted { name, nodes } => {
                match self.aggregator.spec_started(name, nodes) {
                    Ok(event) => self.reporter.report_event(&event),
                    Err(fault) => warn!("dropping spec start: {fault}"),
                }
            }
            RunEvent::NodeLine { index, line } => match self.aggregator.node_line(index, line) {
                Ok(Some(event)) => self.reporter.report_event(&event),
                Ok(None) => {}
                Err(fault) => warn!("dropping node output: {fault}"),
            },
            RunEvent::RunnerMessage { severity, message } => {
                let event = self.aggregator.runner_message(severity, message);
                self.reporter.report_event(&event);
            }
            RunEvent::NodeFinished {
                index,
                role,
                passed,
                message,
            } => match self.aggregator.node_finished(index, role, passed, message) {
                Ok(event) => self.reporter.report_event(&event),
                Err(fault) => warn!("dropping node completion: {fault}"),
            },
            RunEvent::SpecFinished => match self.aggregator.spec_finished() {
                Ok(event) => self.reporter.report_event(&event),
                Err(fault) => warn!("dropping spec finish: {fault}"),
            },
            RunEvent::RunFinished { ack } => {
                match self.aggregator.run_finished() {
                    Ok(event) => self.reporter.report_event(&event),
                    Err(fault) => warn!("dropping run finish: {fault}"),
                }
                // The ack goes out only after the summary has been reported.
                // A duplicate finish is still answered with the final tree
                // so its caller cannot hang; a dropped receiver only means
                // the caller timed out and went away.
                _ = ack.send(self.aggregator.tree().clone());
            }
        }
    }
}

/// A cloneable producer handle for a [`MessageSink`].
#[derive(Clone, Debug)]
pub struct SinkHandle {
    sender: UnboundedSender<RunEvent>,
}

impl SinkHandle {
    /// Sends an event to the sink. Never blocks.
    pub fn send(&self, event: RunEvent) {
        // A send error only means the sink has exited; per the best-effort
        // reporting contract that is not the producer's problem.
        _ = self.sender.send(event);
    }

    /// Ends the run and waits for the sink to confirm that all events sent
    /// before this call have been processed and reported.
    ///
    /// On confirmation, returns the finalized [`TestRunTree`]. On timeout
    /// the run's reporting is unconfirmed, not necessarily lost: the sink
    /// may still complete it later.
    pub async fn end_run(&self, timeout: Duration) -> Result<TestRunTree, EndRunError> {
        let (ack, confirmed) = oneshot::channel();
        self.send(RunEvent::RunFinished { ack });
        match tokio::time::timeout(timeout, confirmed).await {
            Ok(Ok(tree)) => Ok(tree),
            Ok(Err(_)) => Err(EndRunError::SinkClosed),
            Err(_) => Err(EndRunError::Unconfirmed { timeout }),
        }
    }
}
