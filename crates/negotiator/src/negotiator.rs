// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Negotiator (C6): the single driver of `MasterState`, serializing
//! cluster membership and the snapshot-cut protocol (spec.md §4.6).

use crate::driver::SnapshotDriver;
use crate::error::NegotiatorError;
use squall_cluster::{MasterStateChannel, ProcessorRegistry, LIVING_PROCESSORS_PATH};
use squall_core::{MasterState, ProcessorId, ProcessorState};
use squall_store::CoordinationStore;
use squall_topology::Topology;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Tunable timing, spec.md §4.6/§5: `zk_throttle` paces every
/// `untilStatesMatch`-style poll, `snapshot_throttle` paces the flow loop's
/// normal-operation window between cuts.
#[derive(Debug, Clone)]
pub struct NegotiatorConfig {
    pub zk_throttle: Duration,
    pub snapshot_throttle: Duration,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            zk_throttle: Duration::from_millis(200),
            snapshot_throttle: Duration::from_secs(10),
        }
    }
}

/// The Negotiator value. Owns no process-wide globals (spec.md §9): the
/// snapshot-driver's task handle and the fatal-error channel are both plain
/// fields of `run`'s local state, not statics.
pub struct Negotiator<S> {
    store: Arc<S>,
    registry: Arc<ProcessorRegistry<S>>,
    topology: Topology,
    config: NegotiatorConfig,
}

impl<S: CoordinationStore> Negotiator<S> {
    pub fn new(store: Arc<S>, topology: Topology, config: NegotiatorConfig) -> Self {
        let registry = Arc::new(ProcessorRegistry::new(store.clone()));
        Self { store, registry, topology, config }
    }

    /// Registers the Negotiator, then runs the membership supervisor
    /// forever. Returns only on a fatal error — callers (`squall-cli`)
    /// translate that into a non-zero process exit per spec.md §6.
    pub async fn run(self) -> Result<(), NegotiatorError> {
        let channel = MasterStateChannel::new(self.store.clone());
        channel.ensure_initialized().await?;
        self.registry.register(&ProcessorId::negotiator(), ProcessorState::NegotiatorRunning).await?;

        let mut membership = self
            .store
            .watch_children(LIVING_PROCESSORS_PATH)
            .await
            .map_err(squall_cluster::ClusterError::Store)?;

        let expected = self.topology.num_processors() as usize + 1;
        let spout_ids = self.topology.spout_processor_ids();
        let bolt_ids = self.topology.bolt_processor_ids();

        let (fatal_tx, mut fatal_rx) = mpsc::channel::<NegotiatorError>(1);
        let mut driver_handle: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                biased;

                // The double-throw channel (spec.md §7/§9): a fatal error in
                // the snapshot-driver task terminates both that task (it
                // posts here and returns) and this parent loop.
                Some(err) = fatal_rx.recv() => {
                    if let Some(handle) = driver_handle.take() {
                        handle.abort();
                    }
                    return Err(err);
                }

                children = membership.next() => {
                    let children = children.ok_or(NegotiatorError::MembershipWatchClosed)?;

                    // spec.md §4.6 membership supervisor step 1: the cut
                    // protocol must never straddle a membership change.
                    if let Some(handle) = driver_handle.take() {
                        handle.abort();
                    }

                    if children.len() < expected {
                        info!(count = children.len(), expected, "insufficient processors registered");
                        channel.set(&MasterState::Unavailable).await?;
                    } else {
                        info!(count = children.len(), expected, "full cluster registered, starting snapshot driver");
                        let driver = SnapshotDriver::new(
                            self.registry.clone(),
                            MasterStateChannel::new(self.store.clone()),
                            spout_ids.clone(),
                            bolt_ids.clone(),
                            self.config.clone(),
                        );
                        let tx = fatal_tx.clone();
                        driver_handle = Some(tokio::spawn(async move {
                            if let Err(err) = driver.run().await {
                                let _ = tx.send(err).await;
                            }
                        }));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "negotiator_tests.rs"]
mod tests;
