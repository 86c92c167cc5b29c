// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-pipeline tests: handle -> sink -> aggregator -> strategies.

use multinode_reporter::{
    errors::WriteEventError,
    reporter::{
        DeclaredNode, NodeIndex, OutputStrategy, ReportEvent, ReportEventKind, ReporterBuilder,
        ReporterOutput, Severity, SpecName,
    },
    sink::{MessageSink, RunEvent, SinkHandle},
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// Records the kind of every event it sees, for ordering assertions.
#[derive(Clone, Default)]
struct RecordingStrategy {
    kinds: Arc<Mutex<Vec<&'static str>>>,
}

impl OutputStrategy for RecordingStrategy {
    fn write_event(&mut self, event: &ReportEvent<'_>) -> Result<(), WriteEventError> {
        let kind = match &event.kind {
            ReportEventKind::SpecStarted { .. } => "spec started",
            ReportEventKind::NodeLine { .. } => "node line",
            ReportEventKind::RunnerMessage { .. } => "runner message",
            ReportEventKind::NodePassed { .. } => "node passed",
            ReportEventKind::NodeFailed { .. } => "node failed",
            ReportEventKind::SpecFinished { .. } => "spec finished",
            ReportEventKind::RunFinished { .. } => "run finished",
        };
        self.kinds.lock().unwrap().push(kind);
        Ok(())
    }
}

fn send_passing_spec(handle: &SinkHandle, method: &str) {
    handle.send(RunEvent::SpecStarted {
        name: SpecName::new("MySpec", method),
        nodes: vec![
            DeclaredNode::new(NodeIndex(1), "seed"),
            DeclaredNode::new(NodeIndex(2), "client"),
        ],
    });
    handle.send(RunEvent::NodeLine {
        index: NodeIndex(2),
        line: "joining cluster".to_owned(),
    });
    handle.send(RunEvent::NodeFinished {
        index: NodeIndex(1),
        role: "seed".to_owned(),
        passed: true,
        message: "ok".to_owned(),
    });
    handle.send(RunEvent::NodeFinished {
        index: NodeIndex(2),
        role: "client".to_owned(),
        passed: true,
        message: "ok".to_owned(),
    });
    handle.send(RunEvent::SpecFinished);
}

#[tokio::test]
async fn reports_a_full_run_and_confirms_the_barrier() {
    let recording = RecordingStrategy::default();
    let kinds = recording.kinds.clone();

    let mut buf = Vec::new();
    let (drained_tree, confirmed_tree) = {
        let mut reporter = ReporterBuilder::default().build(ReporterOutput::Buffer(&mut buf));
        reporter.add_strategy(Box::new(recording));
        let (sink, handle) = MessageSink::new(reporter);

        let script = async move {
            send_passing_spec(&handle, "FirstSpec");

            // Second spec: node 2 stays silent, so the spec fails.
            handle.send(RunEvent::SpecStarted {
                name: SpecName::new("MySpec", "SecondSpec"),
                nodes: vec![
                    DeclaredNode::new(NodeIndex(1), "seed"),
                    DeclaredNode::new(NodeIndex(2), "client"),
                ],
            });
            handle.send(RunEvent::RunnerMessage {
                severity: Severity::Warning,
                message: "node 2 is not responding".to_owned(),
            });
            handle.send(RunEvent::NodeFinished {
                index: NodeIndex(1),
                role: "seed".to_owned(),
                passed: true,
                message: "ok".to_owned(),
            });
            handle.send(RunEvent::SpecFinished);

            let tree = handle
                .end_run(Duration::from_secs(5))
                .await
                .expect("the sink confirms the barrier");

            // The barrier only resolves after the run summary has been
            // reported.
            assert_eq!(kinds.lock().unwrap().last(), Some(&"run finished"));
            tree
        };

        tokio::join!(sink.run(), script)
    };

    // Both views of the run agree.
    assert_eq!(drained_tree.specs().len(), 2);
    assert_eq!(confirmed_tree.specs().len(), 2);
    assert_eq!(confirmed_tree.passed_specs(), 1);
    assert!(confirmed_tree.specs()[0].passed());
    assert!(!confirmed_tree.specs()[1].passed());
    assert_eq!(
        confirmed_tree.specs()[1]
            .node(NodeIndex(2))
            .unwrap()
            .passed(),
        None
    );

    let output = String::from_utf8(buf).unwrap();
    assert!(output.contains("Beginning spec MySpec.FirstSpec on 2 nodes"));
    assert!(output.contains("joining cluster"));
    assert!(output.contains("SPEC PASSED: ok"));
    assert!(output.contains("[WARNING]: node 2 is not responding"));
    assert!(output.contains("FINAL RESULT: PASS"));
    assert!(output.contains("FINAL RESULT: FAIL"));
    assert!(output.contains("<----------- BEGIN NODE 2:client ----------->"));
    assert!(output.contains("[received no messages - SILENT FAILURE]."));
    assert!(output.contains("Test run completed in ["));
    assert!(output.contains("with 1/2 specs passed."));
    // No CI annotations were requested.
    assert!(!output.contains("##teamcity"));
}

#[tokio::test]
async fn teamcity_mode_brackets_spec_boundaries() {
    let mut buf = Vec::new();
    let (tree, _) = {
        let reporter = ReporterBuilder::default()
            .set_teamcity(true)
            .build(ReporterOutput::Buffer(&mut buf));
        let (sink, handle) = MessageSink::new(reporter);

        let script = async move {
            send_passing_spec(&handle, "FirstSpec");
            handle
                .end_run(Duration::from_secs(5))
                .await
                .expect("the sink confirms the barrier")
        };

        tokio::join!(sink.run(), script)
    };

    assert_eq!(tree.passed_specs(), 1);
    let output = String::from_utf8(buf).unwrap();
    let started_at = output
        .find("##teamcity[testStarted name='MySpec.FirstSpec']")
        .expect("testStarted marker present");
    let begin_at = output
        .find("Beginning spec MySpec.FirstSpec")
        .expect("plain begin line present");
    assert!(started_at < begin_at, "marker precedes the plain line");
    assert!(output.contains("##teamcity[testFinished name='MySpec.FirstSpec' duration='"));
    assert!(!output.contains("testFailed"));
}

#[tokio::test]
async fn protocol_faults_are_dropped_without_stopping_the_run() {
    let mut buf = Vec::new();
    let (tree, _) = {
        let reporter = ReporterBuilder::default().build(ReporterOutput::Buffer(&mut buf));
        let (sink, handle) = MessageSink::new(reporter);

        let script = async move {
            // Completion with no open spec: dropped.
            handle.send(RunEvent::NodeFinished {
                index: NodeIndex(1),
                role: "seed".to_owned(),
                passed: false,
                message: "too early".to_owned(),
            });
            // Stray spec finish: dropped.
            handle.send(RunEvent::SpecFinished);
            send_passing_spec(&handle, "FirstSpec");
            // Undeclared node: dropped, spec verdict unaffected.
            handle.send(RunEvent::NodeFinished {
                index: NodeIndex(9),
                role: "ghost".to_owned(),
                passed: false,
                message: "boo".to_owned(),
            });
            handle
                .end_run(Duration::from_secs(5))
                .await
                .expect("the sink confirms the barrier")
        };

        tokio::join!(sink.run(), script)
    };

    assert_eq!(tree.specs().len(), 1);
    assert!(tree.specs()[0].passed());
    let output = String::from_utf8(buf).unwrap();
    assert!(!output.contains("too early"));
    assert!(!output.contains("boo"));
}

#[tokio::test]
async fn run_with_no_specs_reports_zero_of_zero() {
    let mut buf = Vec::new();
    let (tree, _) = {
        let reporter = ReporterBuilder::default().build(ReporterOutput::Buffer(&mut buf));
        let (sink, handle) = MessageSink::new(reporter);
        let script = async move {
            handle
                .end_run(Duration::from_secs(5))
                .await
                .expect("the sink confirms the barrier")
        };
        tokio::join!(sink.run(), script)
    };

    assert!(tree.specs().is_empty());
    let output = String::from_utf8(buf).unwrap();
    assert!(output.contains("Test run complete."));
    assert!(output.contains("with 0/0 specs passed."));
}

#[tokio::test]
async fn duplicate_end_run_is_still_answered() {
    let (first, second) = {
        let reporter = ReporterBuilder::default().build(ReporterOutput::Stdout);
        let (sink, handle) = MessageSink::new(reporter);
        let script = async move {
            let first = handle.end_run(Duration::from_secs(5)).await;
            let second = handle.end_run(Duration::from_secs(5)).await;
            (first, second)
        };
        tokio::join!(sink.run(), script).1
    };

    let first = first.expect("first barrier confirmed");
    let second = second.expect("duplicate barrier still answered");
    assert_eq!(first.specs().len(), 0);
    assert_eq!(second.specs().len(), 0);
    assert_eq!(first.end_time(), second.end_time());
}
