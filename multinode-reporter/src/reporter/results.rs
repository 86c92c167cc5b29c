// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate result records for specs and runs.

use crate::{
    reporter::{DeclaredNode, NodeIndex, SpecName},
    time::StopwatchSnapshot,
};
use chrono::{DateTime, Local};
use std::{collections::BTreeMap, time::Duration};

/// The outcome of one node's participation in a spec.
///
/// Created as a placeholder when the spec begins and resolved when the node
/// reports completion. A node that never reports keeps `passed` unresolved,
/// which the derived verdicts treat as a failure (the silent-failure rule)
/// while staying distinguishable from an explicit failure.
#[derive(Clone, Debug)]
pub struct NodeResult {
    index: NodeIndex,
    role: String,
    passed: Option<bool>,
    elapsed: Option<Duration>,
    messages: Vec<String>,
}

impl NodeResult {
    fn placeholder(declared: &DeclaredNode) -> Self {
        Self {
            index: declared.index,
            role: declared.role.clone(),
            passed: None,
            elapsed: None,
            messages: Vec::new(),
        }
    }

    pub(crate) fn resolve(
        &mut self,
        role: String,
        passed: bool,
        message: String,
        elapsed: Duration,
    ) {
        self.role = role;
        self.passed = Some(passed);
        self.elapsed = Some(elapsed);
        self.messages.push(message);
    }

    /// Returns the node's index.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Returns the node's role label.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns the node's reported outcome, or `None` if the node never
    /// reported one.
    pub fn passed(&self) -> Option<bool> {
        self.passed
    }

    /// Returns true if the node explicitly reported a pass.
    pub fn is_passed(&self) -> bool {
        self.passed == Some(true)
    }

    /// Returns the time from spec start to the node's completion report, or
    /// `None` if the node never reported.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Returns the diagnostic messages collected for this node, in arrival
    /// order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// The aggregate results for one spec.
///
/// Mutated by the aggregation engine while the spec is open; read-only once
/// the spec finishes and the record moves into the [`TestRunTree`].
#[derive(Clone, Debug)]
pub struct FactData {
    name: SpecName,
    start_time: DateTime<Local>,
    end_time: Option<DateTime<Local>>,
    elapsed: Option<Duration>,
    node_facts: BTreeMap<NodeIndex, NodeResult>,
}

impl FactData {
    pub(crate) fn new(
        name: SpecName,
        start_time: DateTime<Local>,
        declared_nodes: &[DeclaredNode],
    ) -> Self {
        let node_facts = declared_nodes
            .iter()
            .map(|declared| (declared.index, NodeResult::placeholder(declared)))
            .collect();
        Self {
            name,
            start_time,
            end_time: None,
            elapsed: None,
            node_facts,
        }
    }

    pub(crate) fn finalize(&mut self, snapshot: &StopwatchSnapshot) {
        self.end_time = Some(snapshot.end_time());
        self.elapsed = Some(snapshot.duration);
    }

    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> Option<&mut NodeResult> {
        self.node_facts.get_mut(&index)
    }

    /// Returns the name of the spec.
    pub fn name(&self) -> &SpecName {
        &self.name
    }

    /// Returns the wall-clock time at which the spec started.
    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    /// Returns the wall-clock time at which the spec ended, or `None` if the
    /// spec is still open.
    pub fn end_time(&self) -> Option<DateTime<Local>> {
        self.end_time
    }

    /// Returns the time the spec took from start to end, or `None` if the
    /// spec is still open.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Looks up the result for one node.
    pub fn node(&self, index: NodeIndex) -> Option<&NodeResult> {
        self.node_facts.get(&index)
    }

    /// Iterates over per-node results in node index order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeResult> {
        self.node_facts.values()
    }

    /// Returns the number of nodes declared for this spec.
    pub fn node_count(&self) -> usize {
        self.node_facts.len()
    }

    /// Returns the derived verdict: true iff every node explicitly reported
    /// a pass.
    pub fn passed(&self) -> bool {
        self.node_facts.values().all(|node| node.is_passed())
    }
}

/// The aggregate results for an entire test run.
///
/// Specs are appended in completion order. The tree is append-only until the
/// run finishes and immutable afterwards.
#[derive(Clone, Debug)]
pub struct TestRunTree {
    specs: Vec<FactData>,
    start_time: DateTime<Local>,
    end_time: Option<DateTime<Local>>,
    elapsed: Option<Duration>,
}

impl TestRunTree {
    pub(crate) fn new(start_time: DateTime<Local>) -> Self {
        Self {
            specs: Vec::new(),
            start_time,
            end_time: None,
            elapsed: None,
        }
    }

    pub(crate) fn push(&mut self, fact: FactData) -> &FactData {
        let index = self.specs.len();
        self.specs.push(fact);
        &self.specs[index]
    }

    pub(crate) fn finalize(&mut self, snapshot: &StopwatchSnapshot) {
        self.end_time = Some(snapshot.end_time());
        self.elapsed = Some(snapshot.duration);
    }

    /// Returns the finalized specs, in completion order.
    pub fn specs(&self) -> &[FactData] {
        &self.specs
    }

    /// Returns the number of specs that passed.
    pub fn passed_specs(&self) -> usize {
        self.specs.iter().filter(|fact| fact.passed()).count()
    }

    /// Returns the wall-clock time at which the run started.
    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    /// Returns the wall-clock time at which the run ended, or `None` if the
    /// run is still in progress.
    pub fn end_time(&self) -> Option<DateTime<Local>> {
        self.end_time
    }

    /// Returns the time the run took from start to end, or `None` if the run
    /// is still in progress.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }
}
