// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The processor registry (spec.md §4.2): register a live processor under
//! `/living_processors/{name}-{instance}` as an ephemeral node carrying its
//! current `ProcessorState`, and let any reader list every peer's state in
//! one pass.

use crate::error::ClusterError;
use crate::LIVING_PROCESSORS_PATH;
use squall_core::wire::{decode_processor_state, encode_processor_state};
use squall_core::{ProcessorId, ProcessorState};
use squall_store::CoordinationStore;
use std::collections::HashMap;
use std::sync::Arc;

/// A handle for one processor's registration in the cluster.
///
/// `register()` is called exactly once, at startup, before the processor
/// does anything else — everything downstream (the Negotiator counting
/// children, peers reading `getAllProcessorStates`) assumes a registered
/// processor's entry already carries its first real `ProcessorState`.
pub struct ProcessorRegistry<S> {
    store: Arc<S>,
}

impl<S: CoordinationStore> ProcessorRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn path_for(id: &ProcessorId) -> String {
        format!("{LIVING_PROCESSORS_PATH}/{}", id.registration_key())
    }

    /// Register `id` with `initial_state`. Fails with
    /// `ClusterError::DuplicateProcessor` if the path already exists — the
    /// caller (spec.md §7) treats this as a fatal startup failure, whether
    /// it's the Negotiator (`BadStartupError`-adjacent) or an ordinary
    /// spout/bolt/sink.
    pub async fn register(&self, id: &ProcessorId, initial_state: ProcessorState) -> Result<(), ClusterError> {
        let path = Self::path_for(id);
        let payload = encode_processor_state(&initial_state);
        self.store.register_ephemeral(&path, payload).await.map_err(|err| match err {
            squall_store::StoreError::AlreadyExists(_) => ClusterError::DuplicateProcessor(id.clone()),
            other => ClusterError::Store(other),
        })
    }

    /// Overwrite `id`'s current state. Assumes `id` is already registered;
    /// an unregistered processor calling this surfaces the store's
    /// `UnexpectedStoreError` unchanged.
    pub async fn set_processor_state(&self, id: &ProcessorId, state: ProcessorState) -> Result<(), ClusterError> {
        let path = Self::path_for(id);
        let payload = encode_processor_state(&state);
        self.store.set(&path, payload).await?;
        Ok(())
    }

    /// Read every live processor's current state in one pass. A malformed
    /// child (undecodable registration key or payload) is reported as
    /// `ClusterError::MalformedEntry` rather than silently skipped — a
    /// cluster observing corrupt state should stop, not proceed as if that
    /// processor weren't there.
    pub async fn get_all_processor_states(&self) -> Result<HashMap<ProcessorId, ProcessorState>, ClusterError> {
        let children = self.store.children(LIVING_PROCESSORS_PATH).await?;
        let mut states = HashMap::with_capacity(children.len());
        for leaf in children {
            let id = ProcessorId::parse_registration_key(&leaf).ok_or_else(|| ClusterError::MalformedEntry {
                path: format!("{LIVING_PROCESSORS_PATH}/{leaf}"),
                reason: "registration key has no '-{instance}' suffix".to_string(),
            })?;
            let path = Self::path_for(&id);
            let payload = self.store.get(&path).await?.ok_or_else(|| ClusterError::MalformedEntry {
                path: path.clone(),
                reason: "listed as a child but value vanished before read".to_string(),
            })?;
            let state = decode_processor_state(&payload)
                .map_err(|e| ClusterError::MalformedEntry { path, reason: e.to_string() })?;
            states.insert(id, state);
        }
        Ok(states)
    }

    /// The number of currently-registered processors (used by the
    /// Negotiator's membership check, spec.md §4.6 step 2).
    pub async fn children_count(&self) -> Result<usize, ClusterError> {
        Ok(self.store.children(LIVING_PROCESSORS_PATH).await?.len())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
