// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregation and rendering of multi-node test run results.
//!
//! The main types here are [`RunAggregator`], which folds the run's event
//! stream into [`FactData`]/[`TestRunTree`] aggregates, and [`Reporter`],
//! which fans the resulting report events out to output strategies. Both are
//! usually driven through a [`MessageSink`](crate::sink::MessageSink).

mod aggregator;
mod displayer;
mod events;
mod imp;
mod results;
mod teamcity;

pub use aggregator::*;
pub use displayer::*;
pub use events::*;
pub use imp::*;
pub use results::*;
pub use teamcity::*;
