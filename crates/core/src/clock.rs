// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Clock`: a consistent cut of the input stream.
//!
//! A Clock is a mapping `{partition -> offset}` with one entry per spout
//! partition in the topology. Clocks form a join-semilattice under pointwise
//! maximum; equality is pointwise. `BTreeMap` gives deterministic iteration
//! order, which the wire encoding and the Negotiator's "all equal" checks
//! both rely on.

use crate::partition::{Offset, PartitionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A point in the input-stream space: one offset per partition.
///
/// Uniquely names a consistent cut. The empty Clock (no entries) denotes
/// "no prior snapshot" per spec for a bolt's initial `BoltLoaded`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clock(BTreeMap<PartitionId, Offset>);

impl Clock {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (PartitionId, Offset)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, partition: &PartitionId) -> Option<Offset> {
        self.0.get(partition).copied()
    }

    pub fn insert(&mut self, partition: PartitionId, offset: Offset) {
        self.0.insert(partition, offset);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn partitions(&self) -> impl Iterator<Item = &PartitionId> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartitionId, &Offset)> {
        self.0.iter()
    }

    /// Join (pointwise maximum) with another Clock. Missing entries on
    /// either side pass through unchanged — a Clock only grows from joins
    /// involving disjoint partition sets.
    pub fn join(&self, other: &Clock) -> Clock {
        let mut merged = self.0.clone();
        for (partition, offset) in &other.0 {
            merged
                .entry(partition.clone())
                .and_modify(|existing| {
                    if *offset > *existing {
                        *existing = *offset;
                    }
                })
                .or_insert(*offset);
        }
        Clock(merged)
    }

    /// True if every entry in `self` is `<=` the corresponding entry in
    /// `other` and `other` has an entry for every partition in `self`.
    pub fn le(&self, other: &Clock) -> bool {
        self.0
            .iter()
            .all(|(p, o)| other.0.get(p).is_some_and(|oo| o <= oo))
    }

    /// True iff this Clock has exactly one entry per partition in `expected`
    /// — the "cut completeness" property required of every Clock the
    /// snapshot-cut protocol produces.
    pub fn covers_exactly(&self, expected: &[PartitionId]) -> bool {
        self.0.len() == expected.len() && expected.iter().all(|p| self.0.contains_key(p))
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (partition, offset)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{partition}:{offset}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(PartitionId, Offset)> for Clock {
    fn from_iter<T: IntoIterator<Item = (PartitionId, Offset)>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
