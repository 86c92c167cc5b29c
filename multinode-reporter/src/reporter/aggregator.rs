// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The run lifecycle state machine.
//!
//! [`RunAggregator`] applies inbound events one at a time and hands back the
//! [`ReportEvent`] to forward to output strategies. It is synchronous and
//! holds no channel plumbing, so the lifecycle rules can be tested without a
//! runtime; the [`MessageSink`](crate::sink::MessageSink) drives it from its
//! inbox.

use crate::{
    errors::ProtocolFault,
    reporter::{
        DeclaredNode, FactData, NodeIndex, ReportEvent, ReportEventKind, Severity, SpecName,
        TestRunTree,
    },
    time::{StopwatchStart, stopwatch},
};

/// Aggregates a run's events into a [`TestRunTree`], producing one report
/// event per observable input.
///
/// Lifecycle faults are returned as [`ProtocolFault`] values; the caller
/// decides whether to log or surface them. Applying a faulty event never
/// changes aggregate state.
#[derive(Debug)]
pub struct RunAggregator {
    run_stopwatch: StopwatchStart,
    open_spec: Option<OpenSpec>,
    tree: TestRunTree,
    finished: bool,
}

#[derive(Debug)]
struct OpenSpec {
    fact: FactData,
    stopwatch: StopwatchStart,
}

impl RunAggregator {
    /// Creates a new aggregator. The run clock starts now.
    pub fn new() -> Self {
        let run_stopwatch = stopwatch();
        let tree = TestRunTree::new(run_stopwatch.start_time());
        Self {
            run_stopwatch,
            open_spec: None,
            tree,
            finished: false,
        }
    }

    /// Opens a new spec with a placeholder result per declared node.
    pub fn spec_started(
        &mut self,
        name: SpecName,
        declared_nodes: Vec<DeclaredNode>,
    ) -> Result<ReportEvent<'_>, ProtocolFault> {
        if self.finished {
            return Err(ProtocolFault::RunAlreadyFinished);
        }
        if let Some(open) = &self.open_spec {
            return Err(ProtocolFault::SpecStillOpen {
                begun: name,
                open: open.fact.name().clone(),
            });
        }

        let spec_stopwatch = stopwatch();
        let node_count = declared_nodes.len();
        let fact = FactData::new(name.clone(), spec_stopwatch.start_time(), &declared_nodes);
        self.open_spec = Some(OpenSpec {
            fact,
            stopwatch: spec_stopwatch,
        });
        Ok(self.report(ReportEventKind::SpecStarted { name, node_count }))
    }

    /// Passes a node's log fragment through to the strategies.
    ///
    /// Returns `Ok(None)` when no spec is open: stray node output outside
    /// spec boundaries is dropped quietly rather than treated as a fault.
    pub fn node_line(
        &self,
        index: NodeIndex,
        line: String,
    ) -> Result<Option<ReportEvent<'_>>, ProtocolFault> {
        let Some(open) = &self.open_spec else {
            return Ok(None);
        };
        let node = open
            .fact
            .node(index)
            .ok_or(ProtocolFault::UndeclaredNode { index })?;
        Ok(Some(self.report(ReportEventKind::NodeLine {
            index,
            role: node.role().to_owned(),
            line,
        })))
    }

    /// Passes a runner-level log message through to the strategies.
    ///
    /// Runner messages are legal at any point in the run lifecycle.
    pub fn runner_message(&self, severity: Severity, message: String) -> ReportEvent<'_> {
        self.report(ReportEventKind::RunnerMessage { severity, message })
    }

    /// Records a node's completion report for the open spec.
    pub fn node_finished(
        &mut self,
        index: NodeIndex,
        role: String,
        passed: bool,
        message: String,
    ) -> Result<ReportEvent<'_>, ProtocolFault> {
        let open = self.open_spec.as_mut().ok_or(ProtocolFault::NoOpenSpec)?;
        let elapsed = open.stopwatch.snapshot().duration;
        let node = open
            .fact
            .node_mut(index)
            .ok_or(ProtocolFault::UndeclaredNode { index })?;
        node.resolve(role.clone(), passed, message.clone(), elapsed);

        let kind = if passed {
            ReportEventKind::NodePassed {
                index,
                role,
                message,
            }
        } else {
            ReportEventKind::NodeFailed {
                index,
                role,
                message,
            }
        };
        Ok(self.report(kind))
    }

    /// Finalizes the open spec and appends it to the run tree.
    ///
    /// Nodes that never reported completion keep their unresolved flag,
    /// which counts as a failure in the spec's derived verdict.
    pub fn spec_finished(&mut self) -> Result<ReportEvent<'_>, ProtocolFault> {
        let mut open = self.open_spec.take().ok_or(ProtocolFault::NoOpenSpec)?;
        open.fact.finalize(&open.stopwatch.snapshot());

        let run_snapshot = self.run_stopwatch.snapshot();
        let fact = self.tree.push(open.fact);
        Ok(ReportEvent {
            timestamp: run_snapshot.end_time(),
            elapsed: run_snapshot.duration,
            kind: ReportEventKind::SpecFinished { fact },
        })
    }

    /// Finalizes the run tree and produces the run summary event.
    ///
    /// A spec still open at this point is left unreported; the tree only
    /// ever contains finished specs.
    pub fn run_finished(&mut self) -> Result<ReportEvent<'_>, ProtocolFault> {
        if self.finished {
            return Err(ProtocolFault::RunAlreadyFinished);
        }
        self.finished = true;

        let run_snapshot = self.run_stopwatch.snapshot();
        self.tree.finalize(&run_snapshot);
        Ok(ReportEvent {
            timestamp: run_snapshot.end_time(),
            elapsed: run_snapshot.duration,
            kind: ReportEventKind::RunFinished { tree: &self.tree },
        })
    }

    /// Returns the run tree in its current state.
    pub fn tree(&self) -> &TestRunTree {
        &self.tree
    }

    /// Consumes the aggregator, returning the run tree.
    pub fn into_tree(self) -> TestRunTree {
        self.tree
    }

    fn report<'a>(&self, kind: ReportEventKind<'a>) -> ReportEvent<'a> {
        let snapshot = self.run_stopwatch.snapshot();
        ReportEvent {
            timestamp: snapshot.end_time(),
            elapsed: snapshot.duration,
            kind,
        }
    }
}

impl Default for RunAggregator {
    fn default() -> Self {
        Self::new()
    }
}
