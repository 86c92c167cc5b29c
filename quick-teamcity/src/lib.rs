// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generate TeamCity service messages in Rust.
//!
//! Service messages are single lines of the form
//! `##teamcity[messageName attr='value' ...]` that a TeamCity build log
//! consumer picks out of otherwise plain build output. This crate provides
//! the [`escape`] rules for attribute values and [`ServiceMessage`], a small
//! builder for the messages themselves.

mod escape;
mod message;

pub use escape::escape;
pub use message::*;
