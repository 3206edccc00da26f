// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S2: a bolt crashes right after saving a snapshot; the restarted pair
//! replays only the tail the old bolt never got to process, and every
//! record downstream of the cut still lands exactly once (spec.md §8 S2:
//! "sink receives records 74..100 exactly once").

use crate::prelude::{agg0, out0, register_sink, s1_topology, src0, BoundedChannelSink, Cluster, SPOUT_CONFIG};
use squall_bolt::logic::test_support::SummingBolt;
use squall_bolt::BoltRuntime;
use squall_core::MasterState;
use squall_spout::input::test_support::VecInputSource;
use squall_spout::SpoutRuntime;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;

const TOTAL: i64 = 100;

#[tokio::test]
async fn bolt_crash_after_save_replays_only_the_unsaved_tail() {
    let cluster = Cluster::start(s1_topology()).await;

    // The sink's inbound channel outlives either generation of `agg/0` —
    // it belongs to `out/0`, a processor that is never killed in this
    // scenario, the way the spec's S2 only kills the bolt.
    let (out_tx, out_rx) = mpsc::channel(256);
    let delivered: Arc<AsyncMutex<Vec<i64>>> = Arc::new(AsyncMutex::new(Vec::new()));
    let collector = {
        let delivered = delivered.clone();
        let mut out_rx = out_rx;
        tokio::spawn(async move {
            while let Some(payload) = out_rx.recv().await {
                delivered.lock().await.push(payload.tuple);
            }
        })
    };
    register_sink(&cluster, out0()).await;

    // Generation 1: src/0 reads the full 1..=100 stream, agg/0 sums it.
    let mirror = cluster.master_state_mirror().await;
    let input = VecInputSource::new("p0", (1..=TOTAL).collect());
    let (spout_sink, spout_rx) = BoundedChannelSink::new();
    let spout_gen1 = SpoutRuntime::new(src0(), cluster.registry.clone(), mirror, input, spout_sink, SPOUT_CONFIG);
    let spout_gen1_handle = tokio::spawn(spout_gen1.run());

    let mirror = cluster.master_state_mirror().await;
    let bolt_sink = BoundedChannelSink::from_sender(out_tx.clone());
    let bolt_gen1 = BoltRuntime::new(
        agg0(),
        cluster.registry.clone(),
        mirror,
        spout_rx,
        bolt_sink,
        cluster.snapshot_store.clone(),
        SummingBolt::default(),
    );
    let bolt_gen1_handle = tokio::spawn(bolt_gen1.run());

    // Wait for the first snapshot to land — this is the cut the crash
    // happens just after, matching S2's "kill the bolt process after
    // BoltSaved({p0:73})".
    let (cut_clock, _) = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let Some(entry) = cluster.snapshot_store.latest(&agg0()).await.expect("in-memory store never fails") {
                return entry;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("the Negotiator should drive at least one snapshot cut within 10s");
    let cut_offset = cut_clock.get(&"p0".into()).expect("the cut must have an entry for p0").0;
    assert!((1..TOTAL as u64).contains(&cut_offset), "the cut must land strictly inside the stream");

    // Crash: both the spout and the bolt go away. In a networked deployment
    // the bolt's death alone would break the spout's outbound TCP write and
    // take it down too (spec.md §4.4's own "a fatal error ... propagates");
    // here we make that explicit by aborting both tasks and expiring both
    // ephemeral registrations (simulating session loss for each).
    spout_gen1_handle.abort();
    bolt_gen1_handle.abort();
    cluster.store.expire_ephemeral(&Cluster::living_path(&src0()));
    cluster.store.expire_ephemeral(&Cluster::living_path(&agg0()));

    let mut mirror = cluster.master_state_mirror().await;
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if mirror.current() == MasterState::Unavailable {
                return;
            }
            mirror.changed().await;
        }
    })
    .await
    .expect("the Negotiator should observe the membership drop within 5s");

    // Restart: a fresh spout reading the *whole* stream again (a freshly
    // reconnected input source, not a resumed one) and a fresh bolt that
    // loads the snapshot just captured — together they must reproduce only
    // the tail the old bolt never flushed.
    let mirror = cluster.master_state_mirror().await;
    let input = VecInputSource::new("p0", (1..=TOTAL).collect());
    let (spout_sink, spout_rx) = BoundedChannelSink::new();
    let spout_gen2 = SpoutRuntime::new(src0(), cluster.registry.clone(), mirror, input, spout_sink, SPOUT_CONFIG);
    let _spout_gen2_handle = tokio::spawn(spout_gen2.run());

    let mirror = cluster.master_state_mirror().await;
    let bolt_sink = BoundedChannelSink::from_sender(out_tx);
    let bolt_gen2 = BoltRuntime::new(
        agg0(),
        cluster.registry.clone(),
        mirror,
        spout_rx,
        bolt_sink,
        cluster.snapshot_store.clone(),
        SummingBolt::default(),
    );
    let _bolt_gen2_handle = tokio::spawn(bolt_gen2.run());

    let expected_total: i64 = (1..=TOTAL).sum();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let totals = delivered.lock().await;
            if totals.last().copied() == Some(expected_total) {
                return;
            }
            drop(totals);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("the restarted pair should finish replaying the tail within 10s");

    let totals = delivered.lock().await;
    assert!(totals.windows(2).all(|w| w[0] < w[1]), "the running sum must be strictly increasing across the restart");
    assert_eq!(*totals.last().unwrap(), expected_total, "exactly-once bolt state means the final sum is unaffected by the crash");

    collector.abort();
}
