// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The master-state channel (spec.md §4.3): a single persistent node whose
//! value is the global `MasterState`. The Negotiator is the sole writer;
//! everyone else maintains a local mirror kept fresh by a data-watch.

use crate::error::ClusterError;
use crate::MASTER_STATE_PATH;
use squall_core::wire::{decode_master_state, encode_master_state};
use squall_core::MasterState;
use squall_store::CoordinationStore;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// The Negotiator's write handle on `/master_state`.
pub struct MasterStateChannel<S> {
    store: Arc<S>,
}

impl<S: CoordinationStore> MasterStateChannel<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create `/master_state` with `Unavailable` if it does not already
    /// exist. Idempotent across Negotiator restarts — spec.md §4.3:
    /// "creation is performed once by the Negotiator at startup and is
    /// idempotent across restarts (existing value is preserved if one is
    /// present, so recovery sees the last known state)".
    pub async fn ensure_initialized(&self) -> Result<(), ClusterError> {
        let payload = encode_master_state(&MasterState::Unavailable);
        match self.store.create_persistent(MASTER_STATE_PATH, payload).await {
            Ok(()) => Ok(()),
            Err(squall_store::StoreError::AlreadyExists(_)) => Ok(()),
            Err(other) => Err(ClusterError::Store(other)),
        }
    }

    /// Overwrite the global `MasterState`. Only the Negotiator calls this;
    /// nothing enforces single-writer-ness at this layer (spec.md §8
    /// property 1 is a testable property of the whole system, not a lock
    /// here) — see `squall-negotiator` for the caller that owns it.
    pub async fn set(&self, state: &MasterState) -> Result<(), ClusterError> {
        let payload = encode_master_state(state);
        self.store.set(MASTER_STATE_PATH, payload).await?;
        Ok(())
    }
}

/// A single-slot mailbox mirroring `/master_state`: one writer (the
/// background watch task spawned by [`inject_master_state`]), any number of
/// readers. `tokio::sync::watch` already is exactly this primitive —
/// "latest value wins", readers observe every value they haven't yet seen
/// without blocking the writer.
#[derive(Clone)]
pub struct MasterStateMirror {
    rx: watch::Receiver<MasterState>,
}

impl MasterStateMirror {
    /// The most recently observed `MasterState`, without waiting for a
    /// change. This is the "poll the mirror" access pattern spec.md §4.3
    /// calls for — callers loop on this, they never block inside a watch
    /// callback.
    pub fn current(&self) -> MasterState {
        self.rx.borrow().clone()
    }

    /// Block until the mirror's value changes from what this handle last
    /// observed, then return the new value. Returns `None` if the
    /// background watch task has exited (coordination session lost).
    pub async fn changed(&mut self) -> Option<MasterState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow().clone())
    }
}

/// Start a background data-watch on `/master_state` and hand the caller a
/// mirror kept fresh by it, spec.md §4.3's `injectMasterState(session,
/// bodyFn)` — except `bodyFn` is simply "whatever the caller does with the
/// returned mirror", since Rust has no convenient higher-order
/// continuation-passing idiom for this that the teacher's corpus uses.
pub async fn inject_master_state<S: CoordinationStore>(store: Arc<S>) -> Result<MasterStateMirror, ClusterError> {
    let mut data_watch = store.watch_data(MASTER_STATE_PATH).await?;

    // `watch_data`'s contract (squall-store) delivers the current value as
    // its first item, so this doubles as the mirror's initial read — no
    // separate `get()` call that could race the watch's own first delivery.
    let first_bytes = data_watch
        .next()
        .await
        .ok_or_else(|| ClusterError::Store(squall_store::StoreError::ConnectionError(
            "watch closed before delivering an initial value".to_string(),
        )))?;
    let initial = decode_master_state(&first_bytes)
        .map_err(|e| ClusterError::MalformedEntry { path: MASTER_STATE_PATH.to_string(), reason: e.to_string() })?;

    let (tx, rx) = watch::channel(initial);

    tokio::spawn(async move {
        while let Some(bytes) = data_watch.next().await {
            match decode_master_state(&bytes) {
                Ok(state) => {
                    if tx.send(state).is_err() {
                        return;
                    }
                }
                Err(e) => warn!(error = %e, "dropping malformed /master_state update"),
            }
        }
    });

    Ok(MasterStateMirror { rx })
}

#[cfg(test)]
#[path = "master_state_tests.rs"]
mod tests;
