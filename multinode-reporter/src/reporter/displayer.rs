// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable output for report events.

use crate::{
    errors::WriteEventError,
    helpers::plural,
    reporter::{
        FactData, OutputStrategy, ReporterOutput,
        events::{ReportEvent, ReportEventKind, Severity},
    },
};
use chrono::{DateTime, Local};
use owo_colors::{OwoColorize, Style};
use std::{
    fmt,
    io::{self, Write},
    time::Duration,
};

/// Renders one fixed human-readable line per report event.
///
/// Every line carries the event's timestamp and a role tag (`[RUNNER]` or
/// `[NODE{n}:{role}]`). Colors are opt-in at construction and confined to
/// this type; the rest of the crate never touches styling.
pub struct DisplayStrategy<'a> {
    output: OutputImpl<'a>,
    styles: Box<Styles>,
}

impl<'a> DisplayStrategy<'a> {
    /// Creates a new display strategy writing to the given output.
    pub fn new(output: ReporterOutput<'a>, should_colorize: bool) -> Self {
        let mut styles = Box::<Styles>::default();
        if should_colorize {
            styles.colorize();
        }
        let output = match output {
            ReporterOutput::Stdout => OutputImpl::Stdout(io::stdout()),
            ReporterOutput::Buffer(buf) => OutputImpl::Buffer(buf),
        };
        Self { output, styles }
    }

    pub(super) fn write_line(&mut self, line: &str) -> Result<(), WriteEventError> {
        writeln!(self.output, "{line}").map_err(WriteEventError::Io)
    }

    fn write_event_impl(&mut self, event: &ReportEvent<'_>) -> io::Result<()> {
        let time = ShortTime(event.timestamp);
        match &event.kind {
            ReportEventKind::SpecStarted { name, node_count } => self.write_runner_line(
                &time,
                format_args!(
                    "Beginning spec {name} on {node_count} {}",
                    plural::nodes_str(*node_count)
                ),
            ),
            ReportEventKind::NodeLine { index, role, line } => {
                writeln!(self.output, "[NODE{index}:{role}][{time}]: {line}")
            }
            ReportEventKind::RunnerMessage { severity, message } => {
                let line = format!("[RUNNER][{time}][{severity}]: {message}");
                let style = self.styles.for_severity(*severity);
                writeln!(self.output, "{}", line.style(style))
            }
            ReportEventKind::NodePassed {
                index,
                role,
                message,
            } => {
                let line = format!("[NODE{index}:{role}][{time}]: SPEC PASSED: {message}");
                writeln!(self.output, "{}", line.style(self.styles.pass))
            }
            ReportEventKind::NodeFailed {
                index,
                role,
                message,
            } => {
                let line = format!("[NODE{index}:{role}][{time}]: SPEC FAILED: {message}");
                writeln!(self.output, "{}", line.style(self.styles.fail))
            }
            ReportEventKind::SpecFinished { fact } => {
                self.write_runner_line(&time, format_args!("Spec completed."))?;
                self.write_spec_results(&time, fact)
            }
            ReportEventKind::RunFinished { tree } => {
                self.write_runner_line(&time, format_args!("Test run complete."))?;
                let total = tree.specs().len();
                self.write_runner_line(
                    &time,
                    format_args!(
                        "Test run completed in [{}] with {}/{} {} passed.",
                        DisplayDuration(tree.elapsed().unwrap_or_default()),
                        tree.passed_specs(),
                        total,
                        plural::specs_str(total),
                    ),
                )?;
                for fact in tree.specs() {
                    self.write_spec_results(&time, fact)?;
                }
                Ok(())
            }
        }
    }

    fn write_spec_results(&mut self, time: &ShortTime, fact: &FactData) -> io::Result<()> {
        self.write_runner_line(time, format_args!("Results for {}", fact.name()))?;
        self.write_runner_line(
            time,
            format_args!("Start time: {}", WallClock(fact.start_time())),
        )?;
        for node in fact.nodes() {
            self.write_runner_line(
                time,
                format_args!(
                    " --> Node {}:{} : {} [{} elapsed]",
                    node.index(),
                    node.role(),
                    verdict_str(node.is_passed()),
                    DisplayDuration(node.elapsed().unwrap_or_default()),
                ),
            )?;
        }
        // A finalized fact always has an end time; falling back to the start
        // time keeps a faulty replay best-effort instead of panicking.
        let end_time = fact.end_time().unwrap_or_else(|| fact.start_time());
        self.write_runner_line(time, format_args!("End time: {}", WallClock(end_time)))?;
        self.write_runner_line(
            time,
            format_args!(
                "FINAL RESULT: {} after {}.",
                verdict_str(fact.passed()),
                DisplayDuration(fact.elapsed().unwrap_or_default()),
            ),
        )?;

        if !fact.passed() {
            self.write_runner_line(time, format_args!("Failure messages by Node"))?;
            for node in fact.nodes().filter(|node| !node.is_passed()) {
                self.write_runner_line(
                    time,
                    format_args!(
                        "<----------- BEGIN NODE {}:{} ----------->",
                        node.index(),
                        node.role()
                    ),
                )?;
                for message in node.messages() {
                    self.write_runner_line(time, format_args!(" --> {message}"))?;
                }
                if node.messages().is_empty() {
                    self.write_runner_line(
                        time,
                        format_args!("[received no messages - SILENT FAILURE]."),
                    )?;
                }
                self.write_runner_line(
                    time,
                    format_args!(
                        "<----------- END NODE {}:{} ----------->",
                        node.index(),
                        node.role()
                    ),
                )?;
            }
        }
        Ok(())
    }

    fn write_runner_line(&mut self, time: &ShortTime, message: fmt::Arguments<'_>) -> io::Result<()> {
        let line = format!("[RUNNER][{time}]: {message}");
        writeln!(self.output, "{}", line.style(self.styles.runner))
    }
}

impl OutputStrategy for DisplayStrategy<'_> {
    fn write_event(&mut self, event: &ReportEvent<'_>) -> Result<(), WriteEventError> {
        self.write_event_impl(event).map_err(WriteEventError::Io)
    }
}

impl fmt::Debug for DisplayStrategy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayStrategy")
            .field("styles", &self.styles)
            .finish_non_exhaustive()
    }
}

enum OutputImpl<'a> {
    Stdout(io::Stdout),
    Buffer(&'a mut Vec<u8>),
}

impl Write for OutputImpl<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(stdout) => stdout.write(buf),
            Self::Buffer(buffer) => buffer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(stdout) => stdout.flush(),
            Self::Buffer(buffer) => buffer.flush(),
        }
    }
}

fn verdict_str(passed: bool) -> &'static str {
    if passed { "PASS" } else { "FAIL" }
}

#[derive(Debug, Default)]
struct Styles {
    runner: Style,
    pass: Style,
    fail: Style,
    debug: Style,
    info: Style,
    warning: Style,
    error: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.runner = Style::new().yellow();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.debug = Style::new().dimmed();
        self.info = Style::new();
        self.warning = Style::new().yellow().bold();
        self.error = Style::new().red().bold();
    }

    fn for_severity(&self, severity: Severity) -> Style {
        match severity {
            Severity::Debug => self.debug,
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
        }
    }
}

struct ShortTime(DateTime<Local>);

impl fmt::Display for ShortTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

struct WallClock(DateTime<Local>);

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

struct DisplayDuration(Duration);

impl fmt::Display for DisplayDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // .3 prints three digits after the decimal point, e.g. "12.345s".
        write!(f, "{:.3}s", self.0.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{DeclaredNode, NodeIndex, SpecName};
    use crate::time::StopwatchSnapshot;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn fixed_timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2020, 5, 4, 12, 34, 56).unwrap()
    }

    fn event(kind: ReportEventKind<'_>) -> ReportEvent<'_> {
        ReportEvent {
            timestamp: fixed_timestamp(),
            elapsed: Duration::from_secs(5),
            kind,
        }
    }

    fn render(kind: ReportEventKind<'_>) -> String {
        let mut buf = Vec::new();
        let mut strategy = DisplayStrategy::new(ReporterOutput::Buffer(&mut buf), false);
        strategy
            .write_event(&event(kind))
            .expect("buffer writes cannot fail");
        drop(strategy);
        String::from_utf8(buf).expect("output is valid UTF-8")
    }

    /// A spec with node 1 passed and node 2 silent, finalized 2.5s after a
    /// fixed start time.
    fn failed_fact() -> FactData {
        let declared = vec![
            DeclaredNode::new(NodeIndex(1), "role1"),
            DeclaredNode::new(NodeIndex(2), "role2"),
        ];
        let mut fact = FactData::new(SpecName::new("T", "M"), fixed_timestamp(), &declared);
        fact.node_mut(NodeIndex(1))
            .unwrap()
            .resolve("role1".to_owned(), true, "ok".to_owned(), Duration::from_millis(1500));
        fact.finalize(&StopwatchSnapshot {
            start_time: fixed_timestamp(),
            duration: Duration::from_millis(2500),
        });
        fact
    }

    #[test]
    fn spec_started_line() {
        assert_eq!(
            render(ReportEventKind::SpecStarted {
                name: SpecName::new("T", "M"),
                node_count: 2,
            }),
            "[RUNNER][12:34:56]: Beginning spec T.M on 2 nodes\n"
        );
    }

    #[test]
    fn spec_started_line_single_node() {
        assert_eq!(
            render(ReportEventKind::SpecStarted {
                name: SpecName::new("T", "M"),
                node_count: 1,
            }),
            "[RUNNER][12:34:56]: Beginning spec T.M on 1 node\n"
        );
    }

    #[test]
    fn node_line() {
        assert_eq!(
            render(ReportEventKind::NodeLine {
                index: NodeIndex(2),
                role: "role2".to_owned(),
                line: "connecting to seed".to_owned(),
            }),
            "[NODE2:role2][12:34:56]: connecting to seed\n"
        );
    }

    #[test_case(Severity::Debug, "DEBUG"; "debug")]
    #[test_case(Severity::Info, "INFO"; "info")]
    #[test_case(Severity::Warning, "WARNING"; "warning")]
    #[test_case(Severity::Error, "ERROR"; "error")]
    fn runner_message_line(severity: Severity, label: &str) {
        assert_eq!(
            render(ReportEventKind::RunnerMessage {
                severity,
                message: "slow node".to_owned(),
            }),
            format!("[RUNNER][12:34:56][{label}]: slow node\n")
        );
    }

    #[test]
    fn node_passed_line() {
        assert_eq!(
            render(ReportEventKind::NodePassed {
                index: NodeIndex(1),
                role: "role1".to_owned(),
                message: "ok".to_owned(),
            }),
            "[NODE1:role1][12:34:56]: SPEC PASSED: ok\n"
        );
    }

    #[test]
    fn node_failed_line() {
        assert_eq!(
            render(ReportEventKind::NodeFailed {
                index: NodeIndex(1),
                role: "role1".to_owned(),
                message: "boom".to_owned(),
            }),
            "[NODE1:role1][12:34:56]: SPEC FAILED: boom\n"
        );
    }

    #[test]
    fn spec_finished_block_with_silent_failure() {
        let fact = failed_fact();
        let output = render(ReportEventKind::SpecFinished { fact: &fact });
        assert_eq!(
            output,
            "\
[RUNNER][12:34:56]: Spec completed.
[RUNNER][12:34:56]: Results for T.M
[RUNNER][12:34:56]: Start time: 2020-05-04 12:34:56
[RUNNER][12:34:56]:  --> Node 1:role1 : PASS [1.500s elapsed]
[RUNNER][12:34:56]:  --> Node 2:role2 : FAIL [0.000s elapsed]
[RUNNER][12:34:56]: End time: 2020-05-04 12:34:58
[RUNNER][12:34:56]: FINAL RESULT: FAIL after 2.500s.
[RUNNER][12:34:56]: Failure messages by Node
[RUNNER][12:34:56]: <----------- BEGIN NODE 2:role2 ----------->
[RUNNER][12:34:56]: [received no messages - SILENT FAILURE].
[RUNNER][12:34:56]: <----------- END NODE 2:role2 ----------->
"
        );
    }

    #[test]
    fn spec_finished_block_with_explicit_failure_messages() {
        let declared = vec![DeclaredNode::new(NodeIndex(1), "role1")];
        let mut fact = FactData::new(SpecName::new("T", "M"), fixed_timestamp(), &declared);
        fact.node_mut(NodeIndex(1)).unwrap().resolve(
            "role1".to_owned(),
            false,
            "assertion failed".to_owned(),
            Duration::from_millis(750),
        );
        fact.finalize(&StopwatchSnapshot {
            start_time: fixed_timestamp(),
            duration: Duration::from_millis(1000),
        });

        let output = render(ReportEventKind::SpecFinished { fact: &fact });
        assert!(output.contains("[RUNNER][12:34:56]:  --> assertion failed\n"));
        assert!(!output.contains("SILENT FAILURE"));
    }

    #[test]
    fn run_finished_summary_with_no_specs() {
        let tree = {
            let mut aggregator = crate::reporter::RunAggregator::new();
            aggregator.run_finished().expect("run not finished yet");
            aggregator.into_tree()
        };
        let output = render(ReportEventKind::RunFinished { tree: &tree });
        assert!(output.starts_with("[RUNNER][12:34:56]: Test run complete.\n"));
        assert!(output.contains("with 0/0 specs passed.\n"));
    }

    #[test]
    fn colorized_lines_carry_ansi_codes() {
        let mut buf = Vec::new();
        let mut strategy = DisplayStrategy::new(ReporterOutput::Buffer(&mut buf), true);
        strategy
            .write_event(&event(ReportEventKind::NodePassed {
                index: NodeIndex(1),
                role: "role1".to_owned(),
                message: "ok".to_owned(),
            }))
            .expect("buffer writes cannot fail");
        drop(strategy);
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("\u{1b}["), "expected ANSI codes in {output:?}");
    }
}
