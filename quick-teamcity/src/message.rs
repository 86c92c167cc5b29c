// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::escape;
use indexmap::map::IndexMap;
use std::fmt;

/// A single TeamCity service message.
///
/// Rendered through `Display` as `##teamcity[name attr1='value1' ...]`, with
/// attribute values escaped per [`escape`]. Attributes keep their insertion
/// order; writing to an existing key replaces its value in place.
///
/// The message name and attribute keys are TeamCity-defined identifiers and
/// are rendered as-is.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ServiceMessage {
    /// The name of this message, e.g. `testStarted`.
    pub name: String,

    /// The attributes of this message, in insertion order.
    pub attrs: IndexMap<String, String>,
}

impl ServiceMessage {
    /// Creates a new service message with the given name and no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: IndexMap::new(),
        }
    }

    /// Creates a `testSuiteStarted` message for the given suite name.
    pub fn test_suite_started(name: impl Into<String>) -> Self {
        Self::named_message("testSuiteStarted", name)
    }

    /// Creates a `testSuiteFinished` message for the given suite name.
    pub fn test_suite_finished(name: impl Into<String>) -> Self {
        Self::named_message("testSuiteFinished", name)
    }

    /// Creates a `testStarted` message for the given test name.
    pub fn test_started(name: impl Into<String>) -> Self {
        Self::named_message("testStarted", name)
    }

    /// Creates a `testFinished` message for the given test name.
    pub fn test_finished(name: impl Into<String>) -> Self {
        Self::named_message("testFinished", name)
    }

    /// Creates a `testPassed` message for the given test name.
    pub fn test_passed(name: impl Into<String>) -> Self {
        Self::named_message("testPassed", name)
    }

    /// Creates a `testFailed` message for the given test name.
    pub fn test_failed(name: impl Into<String>) -> Self {
        Self::named_message("testFailed", name)
    }

    fn named_message(message_name: &str, name: impl Into<String>) -> Self {
        let mut message = Self::new(message_name);
        message.attr("name", name);
        message
    }

    /// Sets an attribute, replacing the value in place if the key exists.
    pub fn attr(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ServiceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "##teamcity[{}", self.name)?;
        for (key, value) in &self.attrs {
            write!(f, " {}='{}'", key, escape(value))?;
        }
        write!(f, "]")
    }
}
