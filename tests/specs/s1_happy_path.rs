// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S1: one spout, one bolt, one sink, no failures — the cluster drives
//! itself from `Unavailable` through a full snapshot cut while every
//! record the spout emits is delivered to the sink exactly once, in order.

use crate::prelude::{agg0, out0, register_sink, s1_topology, spawn_bolt, spawn_spout, src0, Cluster};
use squall_core::ProcessorId;
use std::time::Duration;

#[tokio::test]
async fn records_are_delivered_once_and_a_snapshot_is_cut() {
    let cluster = Cluster::start(s1_topology()).await;

    let (_spout_handle, spout_rx) = spawn_spout(&cluster, src0(), (1..=100).collect()).await;
    let (_bolt_handle, mut sink_rx) = spawn_bolt(&cluster, agg0(), spout_rx).await;
    register_sink(&cluster, out0()).await;

    let mut running_totals = Vec::with_capacity(100);
    let collect = async {
        while running_totals.len() < 100 {
            match sink_rx.recv().await {
                Some(payload) => running_totals.push(payload.tuple),
                None => break,
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(10), collect)
        .await
        .expect("all 100 records should reach the sink well within 10s");

    assert_eq!(running_totals.len(), 100, "every record must be delivered exactly once");
    assert!(running_totals.windows(2).all(|w| w[0] < w[1]), "a running sum is strictly increasing");
    assert_eq!(*running_totals.last().unwrap(), (1..=100i64).sum::<i64>(), "the final total must match the input sum");

    let snapshot = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let Some(entry) = cluster
                .snapshot_store
                .latest(&ProcessorId::new("agg", 0))
                .await
                .expect("reading a snapshot from an in-memory store never fails")
            {
                return entry;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("the Negotiator should drive at least one snapshot cut within 10s");

    let (clock, _bytes) = snapshot;
    let cut_offset = clock.get(&"p0".into()).expect("the cut Clock must have an entry for p0");
    assert!(cut_offset.0 >= 1 && cut_offset.0 <= 100, "the cut must land somewhere inside the record stream");
}
