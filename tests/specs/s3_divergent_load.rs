// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S3: two instances of the same bolt load snapshots taken at different
//! Clocks — a startup condition the Negotiator must refuse to paper over
//! (spec.md §4.6 step 3, §7 `BadStartupError`).
//!
//! Built directly against `squall-store`/`squall-cluster`/`squall-negotiator`
//! rather than the shared `Cluster` harness: that harness discards the
//! Negotiator's `Result` (every other scenario only cares that it keeps
//! running), but this scenario's assertion *is* that `Result`.

use squall_bolt::logic::test_support::SummingBolt;
use squall_bolt::snapshot::InMemorySnapshotStore;
use squall_bolt::BoltRuntime;
use squall_cluster::{inject_master_state, MasterStateChannel, ProcessorRegistry};
use squall_core::{Clock, MasterState, Offset, PartitionId, Payload, ProcessorId, ProcessorState};
use squall_negotiator::{Negotiator, NegotiatorConfig, NegotiatorError};
use squall_spout::RecordSink;
use squall_store::MemoryStore;
use squall_topology::{OperatorKind, Topology};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn topology() -> Topology {
    Topology::builder()
        .processor("src", OperatorKind::Spout, 1, ["agg"])
        .processor("agg", OperatorKind::Bolt, 2, ["out"])
        .processor("out", OperatorKind::Sink, 1, Vec::<&str>::new())
        .build()
}

fn agg(instance: u32) -> ProcessorId {
    ProcessorId::new("agg", instance)
}

fn fast_config() -> NegotiatorConfig {
    NegotiatorConfig { zk_throttle: Duration::from_millis(5), snapshot_throttle: Duration::from_millis(50) }
}

/// Never actually invoked: both bolt instances here die in `until_bolts_loaded`,
/// long before either would process a record.
struct UnusedSink;

#[async_trait::async_trait]
impl RecordSink<i64> for UnusedSink {
    async fn emit(&self, _payload: Payload<i64>) -> Result<(), String> {
        panic!("no record should ever reach a bolt stuck behind a divergent startup clock")
    }
}

#[tokio::test]
async fn divergent_bolt_load_clocks_abort_the_negotiator() {
    let store = Arc::new(MemoryStore::new());
    MasterStateChannel::new(store.clone()).ensure_initialized().await.unwrap();
    let mut mirror = inject_master_state(store.clone()).await.unwrap();
    let mut transitions = vec![mirror.current()];

    let registry = Arc::new(ProcessorRegistry::new(store.clone()));
    let snapshot_store = Arc::new(InMemorySnapshotStore::new());

    // Pre-seed two divergent snapshots, exactly spec.md §8 S3's setup.
    snapshot_store
        .save(&agg(0), &Clock::from_entries([(PartitionId::new("p0"), Offset::new(50))]), Vec::new())
        .await
        .unwrap();
    snapshot_store
        .save(&agg(1), &Clock::from_entries([(PartitionId::new("p0"), Offset::new(60))]), Vec::new())
        .await
        .unwrap();

    // Both bolt instances load their (divergent) snapshot, announce
    // `BoltLoaded`, then block forever on an empty channel.
    let (_tx0, rx0) = mpsc::channel::<Payload<i64>>(1);
    let bolt0 = BoltRuntime::new(
        agg(0),
        registry.clone(),
        inject_master_state(store.clone()).await.unwrap(),
        rx0,
        UnusedSink,
        snapshot_store.clone(),
        SummingBolt::default(),
    );
    tokio::spawn(bolt0.run());

    let (_tx1, rx1) = mpsc::channel::<Payload<i64>>(1);
    let bolt1 = BoltRuntime::new(
        agg(1),
        registry.clone(),
        inject_master_state(store.clone()).await.unwrap(),
        rx1,
        UnusedSink,
        snapshot_store.clone(),
        SummingBolt::default(),
    );
    tokio::spawn(bolt1.run());

    // The spout and sink never need to do anything — the driver dies in
    // `until_bolts_loaded`, long before it would ask a spout to rewind.
    registry.register(&ProcessorId::new("src", 0), ProcessorState::SpoutRunning).await.unwrap();
    registry.register(&ProcessorId::new("out", 0), ProcessorState::SinkRunning).await.unwrap();

    let negotiator = Negotiator::new(store.clone(), topology(), fast_config());
    let result = tokio::time::timeout(Duration::from_secs(5), negotiator.run())
        .await
        .expect("the Negotiator should detect the divergence within 5s");

    match result {
        Err(NegotiatorError::BadStartupError(mut pairs)) => {
            pairs.sort_by(|a, b| a.0.instance.cmp(&b.0.instance));
            assert_eq!(pairs.len(), 2);
            assert_eq!(pairs[0].0, agg(0));
            assert_eq!(pairs[0].1.get(&PartitionId::new("p0")), Some(Offset::new(50)));
            assert_eq!(pairs[1].0, agg(1));
            assert_eq!(pairs[1].1.get(&PartitionId::new("p0")), Some(Offset::new(60)));
        }
        other => panic!("expected BadStartupError, got {other:?}"),
    }

    // Drain whatever transitions the mirror picked up meanwhile (best
    // effort — the watch may coalesce identical consecutive values).
    while let Ok(Some(state)) = tokio::time::timeout(Duration::from_millis(50), mirror.changed()).await {
        transitions.push(state);
    }
    assert!(
        transitions.iter().all(|s| !matches!(s, MasterState::Flowing { .. } | MasterState::SpoutsRewind { .. })),
        "a cluster that never agreed on a startup clock must never reach SpoutsRewind or Flowing: {transitions:?}"
    );
}
