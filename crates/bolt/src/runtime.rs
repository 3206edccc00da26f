// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bolt runtime loop implementing spec.md §4.5's contract.

use crate::error::BoltError;
use crate::logic::BoltLogic;
use crate::snapshot::SnapshotStore;
use squall_cluster::{MasterStateMirror, ProcessorRegistry};
use squall_core::{Clock, MasterState, Payload, ProcessorId, ProcessorState};
use squall_store::CoordinationStore;
use squall_spout::RecordSink;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Drives one bolt: loads its last snapshot, announces `BoltLoaded`, then
/// processes incoming payloads from `rx`, aligning flushes to the Clock
/// marker carried by `MasterState::Flowing { next_snapshot: Some(c) }`.
pub struct BoltRuntime<S, L: BoltLogic, K, E> {
    id: ProcessorId,
    registry: Arc<ProcessorRegistry<S>>,
    mirror: MasterStateMirror,
    rx: mpsc::Receiver<Payload<L::In>>,
    sink: E,
    snapshot_store: Arc<K>,
    logic: L,
}

impl<S, L, K, E> BoltRuntime<S, L, K, E>
where
    S: CoordinationStore,
    L: BoltLogic,
    K: SnapshotStore,
    E: RecordSink<L::Out>,
{
    pub fn new(
        id: ProcessorId,
        registry: Arc<ProcessorRegistry<S>>,
        mirror: MasterStateMirror,
        rx: mpsc::Receiver<Payload<L::In>>,
        sink: E,
        snapshot_store: Arc<K>,
        logic: L,
    ) -> Self {
        Self { id, registry, mirror, rx, sink, snapshot_store, logic }
    }

    /// Run until the upstream channel closes or a fatal error occurs.
    pub async fn run(mut self) -> Result<(), BoltError> {
        let loaded_clock = match self.snapshot_store.latest(&self.id).await.map_err(BoltError::SnapshotStore)? {
            Some((clock, bytes)) => {
                let state: L::State = serde_json::from_slice(&bytes)
                    .map_err(|e| BoltError::MalformedState(e.to_string()))?;
                self.logic.restore(state);
                clock
            }
            None => Clock::empty(),
        };
        self.registry.register(&self.id, ProcessorState::bolt_loaded(loaded_clock)).await?;
        info!(processor = %self.id, "bolt loaded");

        let mut pending_snapshot: Option<Clock> = None;
        let mut seen = Clock::empty();
        let mut announced_running = false;
        // The target most recently flushed. `Flowing(Just c)` may still be
        // the mirror's current value for one or more iterations after this
        // bolt's own `flush_snapshot` call returns — the Negotiator's
        // follow-up `Flowing(Nothing)` write hasn't propagated back to this
        // mirror yet — so the reload below must not treat an already-saved
        // target as newly pending, or the next payload would flush and
        // announce `BoltSaved` for `c` a second time, now with state that
        // has also absorbed a post-cut record.
        let mut last_flushed: Option<Clock> = None;

        loop {
            if let MasterState::Flowing { next_snapshot } = self.mirror.current() {
                pending_snapshot = match next_snapshot {
                    Some(target) if last_flushed.as_ref() == Some(&target) => None,
                    other => other,
                };
            }

            let Some(payload) = self.rx.recv().await else {
                return Ok(());
            };

            if !announced_running {
                self.registry.set_processor_state(&self.id, ProcessorState::BoltRunning).await?;
                announced_running = true;
            }

            let clock = payload.clock.clone();
            let outputs = self.logic.process(payload.tuple).await;
            seen = seen.join(&clock);
            for out in outputs {
                self.sink.emit(Payload::new(out, clock.clone())).await.map_err(BoltError::Sink)?;
            }

            if let Some(target) = pending_snapshot.clone() {
                if target.le(&seen) {
                    self.flush_snapshot(&target).await?;
                    pending_snapshot = None;
                    seen = Clock::empty();
                    last_flushed = Some(target);
                    announced_running = false;
                }
            }
        }
    }

    async fn flush_snapshot(&mut self, target: &Clock) -> Result<(), BoltError> {
        let bytes = serde_json::to_vec(&self.logic.snapshot()).map_err(|e| BoltError::MalformedState(e.to_string()))?;
        self.snapshot_store.save(&self.id, target, bytes).await.map_err(BoltError::SnapshotStore)?;
        self.registry.set_processor_state(&self.id, ProcessorState::bolt_saved(target.clone())).await?;
        info!(processor = %self.id, %target, "bolt saved snapshot");
        Ok(())
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
