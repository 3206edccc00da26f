// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partition and offset primitives.
//!
//! A partition is opaque and named; an offset is opaque, per-partition, and
//! totally ordered. Neither type interprets its value — only the pluggable
//! input source (out of core scope) gives offsets meaning.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// The name of an input-stream partition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(pub SmolStr);

impl PartitionId {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartitionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PartitionId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A monotonically increasing, per-partition position in the input stream.
///
/// Opaque and totally ordered; a consumer can seek to any previously
/// observed offset. Offset 0 is the first record in a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Offset(pub u64);

impl Offset {
    pub const ZERO: Offset = Offset(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The offset immediately following this one.
    pub fn next(self) -> Self {
        Offset(self.0 + 1)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Offset {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
