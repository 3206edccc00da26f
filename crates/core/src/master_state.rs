// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The authoritative global mode of the cluster.

use crate::clock::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The cluster's single, Negotiator-written mode of operation.
///
/// Transitions follow a fixed FSM (see `squall-negotiator`'s `Negotiator`);
/// no other ordering is observable externally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MasterState {
    /// Fewer than expected processors registered.
    Unavailable,
    /// Processors registered; waiting for bolts to load.
    Initialization,
    /// Spouts must seek to the given Clock's offsets and pause.
    SpoutsRewind { clock: Clock },
    /// A snapshot cut is in progress; spouts must pause at their next boundary.
    SpoutsPaused,
    /// Normal operation. When `next_snapshot` is present, a snapshot at that
    /// Clock is currently being saved by bolts.
    Flowing { next_snapshot: Option<Clock> },
}

impl MasterState {
    pub fn flowing() -> Self {
        Self::Flowing { next_snapshot: None }
    }

    pub fn flowing_with_snapshot(clock: Clock) -> Self {
        Self::Flowing { next_snapshot: Some(clock) }
    }

    pub fn spouts_rewind(clock: Clock) -> Self {
        Self::SpoutsRewind { clock }
    }

    pub fn is_flowing(&self) -> bool {
        matches!(self, Self::Flowing { .. })
    }

    /// The Clock of the snapshot currently being saved, if any.
    pub fn pending_snapshot(&self) -> Option<&Clock> {
        match self {
            Self::Flowing { next_snapshot: Some(clock) } => Some(clock),
            _ => None,
        }
    }
}

impl fmt::Display for MasterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
            Self::Initialization => write!(f, "initialization"),
            Self::SpoutsRewind { clock } => write!(f, "spouts_rewind({clock})"),
            Self::SpoutsPaused => write!(f, "spouts_paused"),
            Self::Flowing { next_snapshot: None } => write!(f, "flowing"),
            Self::Flowing { next_snapshot: Some(clock) } => write!(f, "flowing(saving {clock})"),
        }
    }
}

#[cfg(test)]
#[path = "master_state_tests.rs"]
mod tests;
