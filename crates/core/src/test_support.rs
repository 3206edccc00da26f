// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::clock::Clock;
use crate::partition::{Offset, PartitionId};

/// Proptest strategies for core state machine types.
pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_partition_id() -> impl Strategy<Value = PartitionId> {
        "p[0-9]{1,2}".prop_map(PartitionId::from)
    }

    pub fn arb_offset() -> impl Strategy<Value = Offset> {
        any::<u64>().prop_map(Offset::new)
    }

    /// A Clock over a fixed, small partition namespace — large enough to
    /// exercise join/ordering behavior, small enough that collisions (two
    /// partitions landing on the same name) are common and exercise the
    /// join-on-overlap path.
    pub fn arb_clock() -> impl Strategy<Value = Clock> {
        prop::collection::vec((arb_partition_id(), arb_offset()), 0..8)
            .prop_map(Clock::from_entries)
    }
}

pub fn clock_with(entries: &[(&str, u64)]) -> Clock {
    Clock::from_entries(
        entries
            .iter()
            .map(|(p, o)| (PartitionId::from(*p), Offset::new(*o))),
    )
}
