// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Processor identity and per-processor state.

use crate::clock::Clock;
use crate::partition::{Offset, PartitionId};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Identifies one instance of one named operator in the topology.
///
/// `0 <= instance < parallelism(name)`. The pair is also the coordination
/// store's ephemeral registration key, rendered as `{name}-{instance}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessorId {
    pub name: SmolStr,
    pub instance: u32,
}

impl ProcessorId {
    pub fn new(name: impl Into<SmolStr>, instance: u32) -> Self {
        Self { name: name.into(), instance }
    }

    /// The Negotiator's own, singular, well-known ProcessorId.
    pub fn negotiator() -> Self {
        Self::new("negotiator", 0)
    }

    /// The `/living_processors/{name}-{instance}` leaf key.
    pub fn registration_key(&self) -> String {
        format!("{}-{}", self.name, self.instance)
    }

    /// Parse a registration key back into a ProcessorId. Fails if the key
    /// has no `-{digits}` suffix.
    pub fn parse_registration_key(key: &str) -> Option<Self> {
        let (name, instance) = key.rsplit_once('-')?;
        let instance: u32 = instance.parse().ok()?;
        Some(Self::new(name, instance))
    }
}

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.registration_key())
    }
}

/// A tagged value describing what a processor is currently doing.
///
/// `UnspecifiedState` is the pre-registration sentinel: it is never written
/// to the store, only ever returned by callers reasoning about a processor
/// that hasn't registered yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessorState {
    UnspecifiedState,
    SpoutRunning,
    /// The spout has stopped reading at `(partition, offset)`; the next
    /// record it emits will have offset > `offset`.
    SpoutPaused { partition: PartitionId, offset: Offset },
    BoltRunning,
    /// The bolt finished loading from a prior snapshot taken at `clock`
    /// (empty Clock if no prior snapshot existed).
    BoltLoaded { clock: Clock },
    /// The bolt has durably written the snapshot for `clock`.
    BoltSaved { clock: Clock },
    SinkRunning,
    /// The Negotiator's own registration value. Not part of spec.md §3's
    /// ProcessorState tags (the Negotiator is the writer of `MasterState`,
    /// not a subject of it) but spec.md §6 still requires `negotiator-0` to
    /// be a live `/living_processors` member with some encoded value.
    NegotiatorRunning,
}

impl ProcessorState {
    pub fn spout_paused(partition: PartitionId, offset: Offset) -> Self {
        Self::SpoutPaused { partition, offset }
    }

    pub fn bolt_loaded(clock: Clock) -> Self {
        Self::BoltLoaded { clock }
    }

    pub fn bolt_saved(clock: Clock) -> Self {
        Self::BoltSaved { clock }
    }

    pub fn as_spout_paused(&self) -> Option<(&PartitionId, Offset)> {
        match self {
            Self::SpoutPaused { partition, offset } => Some((partition, *offset)),
            _ => None,
        }
    }

    pub fn as_bolt_loaded(&self) -> Option<&Clock> {
        match self {
            Self::BoltLoaded { clock } => Some(clock),
            _ => None,
        }
    }

    pub fn as_bolt_saved(&self) -> Option<&Clock> {
        match self {
            Self::BoltSaved { clock } => Some(clock),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnspecifiedState => write!(f, "unspecified"),
            Self::SpoutRunning => write!(f, "spout_running"),
            Self::SpoutPaused { partition, offset } => {
                write!(f, "spout_paused({partition}, {offset})")
            }
            Self::BoltRunning => write!(f, "bolt_running"),
            Self::BoltLoaded { clock } => write!(f, "bolt_loaded({clock})"),
            Self::BoltSaved { clock } => write!(f, "bolt_saved({clock})"),
            Self::SinkRunning => write!(f, "sink_running"),
            Self::NegotiatorRunning => write!(f, "negotiator_running"),
        }
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
