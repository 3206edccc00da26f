// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S4: two Negotiator processes start against the same cluster. Exactly one
//! wins the ephemeral `/living_processors/negotiator-0` registration; the
//! other fails fast with `DuplicateProcessorError` (spec.md §4.2 step 2,
//! §7) rather than silently stepping aside.

use crate::prelude::{s1_topology, Cluster};
use squall_cluster::ClusterError;
use squall_negotiator::{Negotiator, NegotiatorConfig, NegotiatorError};
use squall_core::ProcessorId;
use std::time::Duration;

#[tokio::test]
async fn the_second_negotiator_refuses_to_start() {
    // `Cluster::start` already registers and runs one Negotiator — that is
    // negotiator A, and it keeps running for the lifetime of this test.
    let cluster = Cluster::start(s1_topology()).await;

    // Give negotiator A's registration a moment to land before the race
    // (it registers before doing anything else in `Negotiator::run`).
    tokio::time::sleep(Duration::from_millis(20)).await;

    let negotiator_b = Negotiator::new(
        cluster.store.clone(),
        s1_topology(),
        NegotiatorConfig { zk_throttle: Duration::from_millis(5), snapshot_throttle: Duration::from_millis(50) },
    );
    let result = tokio::time::timeout(Duration::from_secs(2), negotiator_b.run())
        .await
        .expect("a duplicate negotiator-0 registration must fail immediately, not hang");

    match result {
        Err(NegotiatorError::Cluster(ClusterError::DuplicateProcessor(id))) => {
            assert_eq!(id, ProcessorId::negotiator());
        }
        other => panic!("expected DuplicateProcessorError, got {other:?}"),
    }

    // Negotiator A is unaffected — it never observed B's failed attempt
    // (B never got far enough to touch `/master_state` or the membership
    // watch), so it should still be driving the cluster normally.
    assert!(!cluster.negotiator_handle.is_finished(), "negotiator A must still be running after B's failed duplicate start");
}
