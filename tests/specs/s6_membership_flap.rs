// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S6: one spout of a two-partition topology is killed after `SpoutsPaused`
//! is set but before it acknowledges the pause. The snapshot-driver must be
//! cancelled and the cluster must fall back to `Unavailable` — no
//! `Flowing(Just c)` may ever be written for the aborted cut (spec.md §8 S6,
//! §5 "cancellation").
//!
//! Choreographed directly against the registry rather than real
//! `SpoutRuntime`s: the interesting event here is a precise interleaving
//! (kill src/1 strictly between `SpoutsPaused` and its pause-ack), which a
//! real timing-driven runtime can't be made to hit deterministically.

use squall_cluster::{inject_master_state, MasterStateChannel, MasterStateMirror, ProcessorRegistry, LIVING_PROCESSORS_PATH};
use squall_core::{Clock, MasterState, Offset, PartitionId, ProcessorId, ProcessorState};
use squall_negotiator::{Negotiator, NegotiatorConfig};
use squall_store::MemoryStore;
use squall_topology::{OperatorKind, Topology};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const STEP: Duration = Duration::from_secs(2);

fn living_path(id: &ProcessorId) -> String {
    format!("{LIVING_PROCESSORS_PATH}/{}", id.registration_key())
}

fn topology() -> Topology {
    Topology::builder()
        .processor("src", OperatorKind::Spout, 2, ["agg"])
        .processor("agg", OperatorKind::Bolt, 1, ["out"])
        .processor("out", OperatorKind::Sink, 1, Vec::<&str>::new())
        .build()
}

fn fast_config() -> NegotiatorConfig {
    NegotiatorConfig { zk_throttle: Duration::from_millis(5), snapshot_throttle: Duration::from_millis(60) }
}

async fn next(mirror: &mut MasterStateMirror) -> MasterState {
    timeout(STEP, mirror.changed()).await.expect("a master-state change within 2s").expect("mirror stays alive")
}

#[tokio::test]
async fn killing_a_spout_mid_cut_cancels_the_driver_without_ever_writing_flowing_just_c() {
    let store = Arc::new(MemoryStore::new());
    MasterStateChannel::new(store.clone()).ensure_initialized().await.unwrap();
    let mut mirror = inject_master_state(store.clone()).await.unwrap();

    let registry = Arc::new(ProcessorRegistry::new(store.clone()));
    let negotiator = Negotiator::new(store.clone(), topology(), fast_config());
    tokio::spawn(async move {
        let _ = negotiator.run().await;
    });

    let src0 = ProcessorId::new("src", 0);
    let src1 = ProcessorId::new("src", 1);
    let agg0 = ProcessorId::new("agg", 0);
    let out0 = ProcessorId::new("out", 0);
    let p0 = PartitionId::new("p0");
    let p1 = PartitionId::new("p1");

    assert_eq!(next(&mut mirror).await, MasterState::Unavailable);

    // Both spouts start out paused at offset 0 (as if freshly connected and
    // not yet rewound), the bolt has no prior snapshot, the sink just runs.
    // Polling the mirror after every single registration (rather than
    // batching all four) keeps each assertion pinned to the membership
    // event it names — `MasterStateMirror` is a single-slot watch, so a
    // batch of registrations followed by one poll would only be guaranteed
    // to observe the *last* of several queued transitions.
    registry.register(&src0, ProcessorState::spout_paused(p0.clone(), Offset::ZERO)).await.unwrap();
    assert_eq!(next(&mut mirror).await, MasterState::Unavailable);
    registry.register(&src1, ProcessorState::spout_paused(p1.clone(), Offset::ZERO)).await.unwrap();
    assert_eq!(next(&mut mirror).await, MasterState::Unavailable);
    registry.register(&out0, ProcessorState::SinkRunning).await.unwrap();
    assert_eq!(next(&mut mirror).await, MasterState::Unavailable);
    registry.register(&agg0, ProcessorState::bolt_loaded(Clock::empty())).await.unwrap();

    assert_eq!(next(&mut mirror).await, MasterState::Initialization);
    assert!(matches!(next(&mut mirror).await, MasterState::SpoutsRewind { clock } if clock.is_empty()));

    // Both spouts ack the (empty) rewind target immediately.
    registry.set_processor_state(&src0, ProcessorState::spout_paused(p0.clone(), Offset::ZERO)).await.unwrap();
    registry.set_processor_state(&src1, ProcessorState::spout_paused(p1.clone(), Offset::ZERO)).await.unwrap();

    assert_eq!(next(&mut mirror).await, MasterState::flowing());

    // Both spouts resume (clearing their prior SpoutPaused state), exactly
    // as `SpoutRuntime::ensure_running` does on a paused-to-flowing edge.
    registry.set_processor_state(&src0, ProcessorState::SpoutRunning).await.unwrap();
    registry.set_processor_state(&src1, ProcessorState::SpoutRunning).await.unwrap();

    assert_eq!(next(&mut mirror).await, MasterState::SpoutsPaused);

    // src/0 acks quickly; src/1 is killed before it ever does.
    registry.set_processor_state(&src0, ProcessorState::spout_paused(p0, Offset::new(42))).await.unwrap();
    store.expire_ephemeral(&living_path(&src1));

    assert_eq!(
        next(&mut mirror).await,
        MasterState::Unavailable,
        "a spout lost mid-cut must cancel the driver and drop the cluster to Unavailable, never Flowing(Just c)"
    );
}
