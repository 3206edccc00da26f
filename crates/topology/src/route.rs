// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The keyed partitioner (REDESIGN FLAG resolution, see SPEC_FULL.md §9):
//! the source's `downstreamAddresses` always routed to the last instance of
//! the downstream operator, ignoring the payload's key entirely. That makes
//! every downstream but the last one permanently idle. This replaces it with
//! a deterministic hash of the routing key modulo the downstream's
//! parallelism, so record order for a given key always lands on the same
//! instance — required for bolts that key their state by that same value.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// The value a stateless shuffle hashes on to pick a downstream instance.
/// Typically a tuple field (user id, session id, ...); callers derive this
/// from whatever field the topology's routing is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutingKey(Vec<u8>);

impl RoutingKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_str(key: &str) -> Self {
        Self(key.as_bytes().to_vec())
    }

    /// Resolve this key to an instance index in `0..parallelism`.
    ///
    /// `DefaultHasher` (stdlib SipHash) is not a security primitive here —
    /// it's used only because it is deterministic within a process and
    /// identical across every processor holding the same `Topology`, which
    /// is all a shuffle needs: every upstream instance must agree on where a
    /// given key goes.
    pub fn route(&self, parallelism: u32) -> u32 {
        debug_assert!(parallelism > 0, "parallelism must be nonzero to route");
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        (hasher.finish() % parallelism as u64) as u32
    }
}

impl From<&str> for RoutingKey {
    fn from(value: &str) -> Self {
        Self::from_str(value)
    }
}

impl From<String> for RoutingKey {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
