// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where a bolt's flushed state lives, keyed by `(ProcessorId, Clock)`
//! (spec.md §4.5). Distinct from `squall-store::CoordinationStore`: this is
//! durable application state, not coordination metadata, and is never
//! watched — only read on startup and written on a snapshot boundary.

use async_trait::async_trait;
use parking_lot::Mutex;
use squall_core::{Clock, ProcessorId};
use std::collections::HashMap;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist `state` (already serialized by the caller) under `(id, clock)`.
    async fn save(&self, id: &ProcessorId, clock: &Clock, state: Vec<u8>) -> Result<(), String>;

    /// The most recently saved snapshot for `id`, if any.
    async fn latest(&self, id: &ProcessorId) -> Result<Option<(Clock, Vec<u8>)>, String>;
}

/// An in-process [`SnapshotStore`], the only implementation this workspace
/// ships — spec.md never specifies a durability backend for this table, and
/// `run-sample`/the scenario tests only need snapshots to survive a
/// simulated bolt restart within the same process.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    entries: Mutex<HashMap<ProcessorId, (Clock, Vec<u8>)>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, id: &ProcessorId, clock: &Clock, state: Vec<u8>) -> Result<(), String> {
        self.entries.lock().insert(id.clone(), (clock.clone(), state));
        Ok(())
    }

    async fn latest(&self, id: &ProcessorId) -> Result<Option<(Clock, Vec<u8>)>, String> {
        Ok(self.entries.lock().get(id).cloned())
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
