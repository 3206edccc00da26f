// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `squall run-sample`: an entirely in-process, local-mode run of spec.md
//! §8 scenario S1 ("Happy-path snapshot") — one spout, one bolt, one sink,
//! wired directly together over `MemoryStore` with no network transport.
//! Useful for demoing and smoke-testing the cluster coordination protocol
//! without a broker or a coordination-service deployment.

use crate::commands::BoundedChannelSink;
use crate::exit_error::ExitError;
use squall_bolt::logic::test_support::SummingBolt;
use squall_bolt::snapshot::InMemorySnapshotStore;
use squall_bolt::{BoltRuntime, SnapshotStore};
use squall_cluster::{inject_master_state, MasterStateChannel, ProcessorRegistry};
use squall_core::{ProcessorId, ProcessorState};
use squall_negotiator::{Negotiator, NegotiatorConfig};
use squall_spout::input::test_support::VecInputSource;
use squall_spout::{SpoutConfig, SpoutRuntime};
use squall_store::MemoryStore;
use squall_topology::{OperatorKind, Topology};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::info;

const RECORD_COUNT: u64 = 40;

fn sample_topology() -> Topology {
    Topology::builder()
        .processor("src", OperatorKind::Spout, 1, ["agg"])
        .processor("agg", OperatorKind::Bolt, 1, ["out"])
        .processor("out", OperatorKind::Sink, 1, Vec::<&str>::new())
        .build()
}

pub async fn run() -> Result<(), ExitError> {
    let store = Arc::new(MemoryStore::new());
    let topology = sample_topology();

    MasterStateChannel::new(store.clone())
        .ensure_initialized()
        .await
        .map_err(|e| ExitError::fatal(format!("failed to initialize cluster: {e}")))?;

    let registry = Arc::new(ProcessorRegistry::new(store.clone()));
    let snapshot_store = Arc::new(InMemorySnapshotStore::new());

    let negotiator_config =
        NegotiatorConfig { zk_throttle: Duration::from_millis(50), snapshot_throttle: Duration::from_millis(500) };
    let negotiator = Negotiator::new(store.clone(), topology.clone(), negotiator_config);
    let negotiator_handle = tokio::spawn(async move {
        if let Err(err) = negotiator.run().await {
            tracing::error!(%err, "negotiator exited");
        }
    });

    let (to_bolt_tx, to_bolt_rx) = mpsc::channel(64);
    let (to_sink_tx, mut to_sink_rx) = mpsc::channel(64);

    let spout_mirror = inject_master_state(store.clone())
        .await
        .map_err(|e| ExitError::fatal(format!("failed to subscribe spout to master state: {e}")))?;
    let bolt_mirror = inject_master_state(store.clone())
        .await
        .map_err(|e| ExitError::fatal(format!("failed to subscribe bolt to master state: {e}")))?;

    let spout_input = VecInputSource::new("p0", (1..=RECORD_COUNT as i64).collect());
    let spout = SpoutRuntime::new(
        ProcessorId::new("src", 0),
        registry.clone(),
        spout_mirror,
        spout_input,
        BoundedChannelSink::new(to_bolt_tx),
        SpoutConfig::default(),
    );
    let spout_handle = tokio::spawn(async move {
        if let Err(err) = spout.run().await {
            tracing::error!(%err, "spout exited");
        }
    });

    let bolt = BoltRuntime::new(
        ProcessorId::new("agg", 0),
        registry.clone(),
        bolt_mirror,
        to_bolt_rx,
        BoundedChannelSink::new(to_sink_tx),
        snapshot_store.clone(),
        SummingBolt::default(),
    );
    let bolt_handle = tokio::spawn(async move {
        if let Err(err) = bolt.run().await {
            tracing::error!(%err, "bolt exited");
        }
    });

    let sink_id = ProcessorId::new("out", 0);
    registry
        .register(&sink_id, ProcessorState::SinkRunning)
        .await
        .map_err(|e| ExitError::fatal(format!("failed to register sink: {e}")))?;

    let mut received = 0u64;
    let collect = async {
        while received < RECORD_COUNT {
            match to_sink_rx.recv().await {
                Some(payload) => {
                    received += 1;
                    info!(clock = %payload.clock, running_total = payload.tuple, "sink received record");
                }
                None => break,
            }
        }
    };

    timeout(Duration::from_secs(30), collect)
        .await
        .map_err(|_| ExitError::fatal("timed out waiting for the sink to receive every record"))?;

    negotiator_handle.abort();
    spout_handle.abort();
    bolt_handle.abort();

    println!("squall: run-sample processed {received} record(s)");
    if let Ok(Some((clock, _))) = snapshot_store.latest(&ProcessorId::new("agg", 0)).await {
        println!("squall: last snapshot for agg-0 at clock {clock}");
    }
    Ok(())
}
