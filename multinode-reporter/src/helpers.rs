// Copyright (c) The multinode-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General support code for multinode-reporter.

/// Utilities for pluralizing various words based on count or plurality.
pub(crate) mod plural {
    /// Returns "node" if `count` is 1, otherwise "nodes".
    pub(crate) fn nodes_str(count: usize) -> &'static str {
        if count == 1 { "node" } else { "nodes" }
    }

    /// Returns "spec" if `count` is 1, otherwise "specs".
    pub(crate) fn specs_str(count: usize) -> &'static str {
        if count == 1 { "spec" } else { "specs" }
    }
}
