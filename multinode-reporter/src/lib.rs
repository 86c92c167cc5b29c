// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Result aggregation and reporting for multi-node test runs.
//!
//! A multi-node test run executes each spec simultaneously on several worker
//! processes, whose log fragments and pass/fail reports arrive concurrently
//! and in no guaranteed order. This crate collapses that stream into
//! per-spec and per-run result records and renders them as plain or
//! TeamCity-annotated text, without blocking producers.
//!
//! The entry point is [`sink::MessageSink`]: producers push
//! [`sink::RunEvent`]s through a cloneable [`sink::SinkHandle`], a single
//! consumer task drains them in order through a
//! [`reporter::RunAggregator`], and [`sink::SinkHandle::end_run`] provides
//! the shutdown barrier that confirms all buffered output has been
//! processed before the process exits.

pub mod errors;
mod helpers;
pub mod reporter;
pub mod sink;
mod time;
