// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The input-source capability a spout drives. One `InputSource` owns
//! exactly one partition — spec.md §4.4: "a spout owns one input
//! partition."

use async_trait::async_trait;
use squall_core::{Offset, PartitionId};

/// A replayable, seekable source of records for one partition.
///
/// Implementations are expected to be cheap to poll when empty (`next`
/// returning `Ok(None)` promptly rather than blocking indefinitely) — the
/// runtime is responsible for backing off between empty polls, not the
/// source.
#[async_trait]
pub trait InputSource: Send {
    type Item: Send + 'static;

    fn partition(&self) -> &PartitionId;

    /// The offset that would be assigned to the *next* record read. Equal to
    /// the last record's offset while paused, per spec.md §4.4: "the spout
    /// does not advance its own offset during pause, guaranteeing that the
    /// offset recorded in `SpoutPaused` is the exact re-entry point for
    /// replay."
    fn current_offset(&self) -> Offset;

    /// Read the next record and its offset, if one is currently available.
    async fn next(&mut self) -> Result<Option<(Self::Item, Offset)>, String>;

    /// Seek so that the next `next()` call returns the record at `offset`
    /// (or the first record at or after it, for sources with gaps).
    fn seek(&mut self, offset: Offset);
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use std::collections::VecDeque;

    /// An in-memory [`InputSource`] over a fixed vector of items, offsets
    /// assigned `1..=len()` in order. Used by `squall-spout`'s own tests and
    /// by workspace-level scenario tests (spec.md §8 S1/S2).
    pub struct VecInputSource<T> {
        partition: PartitionId,
        items: VecDeque<(T, Offset)>,
        cursor: Offset,
    }

    impl<T: Clone> VecInputSource<T> {
        pub fn new(partition: impl Into<PartitionId>, items: Vec<T>) -> Self {
            let items = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (item, Offset::new(i as u64 + 1)))
                .collect();
            Self { partition: partition.into(), items, cursor: Offset::ZERO }
        }
    }

    #[async_trait]
    impl<T: Clone + Send + 'static> InputSource for VecInputSource<T> {
        type Item = T;

        fn partition(&self) -> &PartitionId {
            &self.partition
        }

        fn current_offset(&self) -> Offset {
            self.cursor
        }

        async fn next(&mut self) -> Result<Option<(Self::Item, Offset)>, String> {
            let Some((item, offset)) = self.items.front() else { return Ok(None) };
            if *offset <= self.cursor {
                self.items.pop_front();
                return Err(format!("non-monotonic offset {offset} at cursor {}", self.cursor));
            }
            let (item, offset) = (item.clone(), *offset);
            self.items.pop_front();
            self.cursor = offset;
            Ok(Some((item, offset)))
        }

        fn seek(&mut self, offset: Offset) {
            self.cursor = offset;
            self.items.retain(|(_, item_offset)| *item_offset > offset);
        }
    }
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
