// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S5: spouts arrive first, bolts last. `MasterState` must stay
//! `Unavailable` for every intermediate membership count and only move to
//! `Initialization` once the full cluster (spec.md §4.6 step 2:
//! `numProcessors + 1`) has registered — never skipping ahead to `Flowing`.
//!
//! The mirror subscribes *before* the Negotiator is spawned (matching
//! `squall-negotiator`'s own membership tests) so every membership-driven
//! write is guaranteed to show up as an observable change, with no race
//! against setup work done inside a hidden `tokio::spawn`.

use crate::prelude::{agg0, out0, s1_topology, src0, NEGOTIATOR_CONFIG};
use squall_cluster::{inject_master_state, MasterStateChannel, MasterStateMirror, ProcessorRegistry};
use squall_core::{MasterState, ProcessorState};
use squall_negotiator::Negotiator;
use squall_store::MemoryStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const STEP: Duration = Duration::from_secs(2);

async fn next(mirror: &mut MasterStateMirror) -> MasterState {
    timeout(STEP, mirror.changed()).await.expect("a master-state change within 2s").expect("mirror stays alive")
}

#[tokio::test]
async fn stays_unavailable_until_bolts_join_last() {
    let store = Arc::new(MemoryStore::new());
    MasterStateChannel::new(store.clone()).ensure_initialized().await.unwrap();
    let mut mirror = inject_master_state(store.clone()).await.unwrap();
    assert_eq!(mirror.current(), MasterState::Unavailable);

    let registry = Arc::new(ProcessorRegistry::new(store.clone()));
    let negotiator = Negotiator::new(store.clone(), s1_topology(), NEGOTIATOR_CONFIG);
    let negotiator_handle = tokio::spawn(async move {
        let _ = negotiator.run().await;
    });

    // Negotiator alone (1 of 4 expected) re-asserts Unavailable on its own
    // startup membership event.
    assert_eq!(next(&mut mirror).await, MasterState::Unavailable);

    // Spouts arrive first.
    registry.register(&src0(), ProcessorState::SpoutRunning).await.unwrap();
    assert_eq!(next(&mut mirror).await, MasterState::Unavailable, "one spout short of quorum must stay Unavailable");

    // Then the sink.
    registry.register(&out0(), ProcessorState::SinkRunning).await.unwrap();
    assert_eq!(next(&mut mirror).await, MasterState::Unavailable, "still short the bolt");

    // Bolts arrive last — only now does the cluster reach quorum.
    registry.register(&agg0(), ProcessorState::BoltRunning).await.unwrap();
    assert_eq!(
        next(&mut mirror).await,
        MasterState::Initialization,
        "the cluster must move straight from Unavailable to Initialization, never to SpoutsRewind/Flowing"
    );

    negotiator_handle.abort();
}
