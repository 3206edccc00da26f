// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the end-to-end scenario tests (spec.md §8 S1-S6): a
//! one-process simulated cluster over `MemoryStore`, with a spout/bolt/sink
//! pipeline wired the same way `squall run-sample` wires one.

use async_trait::async_trait;
use squall_bolt::logic::test_support::SummingBolt;
use squall_bolt::snapshot::InMemorySnapshotStore;
use squall_bolt::BoltRuntime;
use squall_cluster::{inject_master_state, MasterStateChannel, MasterStateMirror, ProcessorRegistry};
use squall_core::{Payload, ProcessorId, ProcessorState};
use squall_negotiator::{Negotiator, NegotiatorConfig};
use squall_spout::input::test_support::VecInputSource;
use squall_spout::{RecordSink, SpoutConfig, SpoutRuntime};
use squall_store::MemoryStore;
use squall_topology::{OperatorKind, Topology};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const NEGOTIATOR_CONFIG: NegotiatorConfig =
    NegotiatorConfig { zk_throttle: Duration::from_millis(10), snapshot_throttle: Duration::from_millis(150) };

pub const SPOUT_CONFIG: SpoutConfig = SpoutConfig { idle_throttle: Duration::from_millis(10) };

/// A [`RecordSink`] over a plain bounded `mpsc::Sender`, the same shape as
/// `squall-cli`'s `BoundedChannelSink` — the CLI binary crate has no `lib`
/// target to depend on, so the scenario tests keep their own copy of this
/// one piece of plumbing.
pub struct BoundedChannelSink<T> {
    tx: mpsc::Sender<Payload<T>>,
}

impl<T> BoundedChannelSink<T> {
    pub fn new() -> (Self, mpsc::Receiver<Payload<T>>) {
        let (tx, rx) = mpsc::channel(64);
        (Self { tx }, rx)
    }

    /// Wraps an existing sender — lets two successive processor generations
    /// (pre- and post-crash) feed the same downstream receiver, the way a
    /// real sink's output channel outlives the upstream processor that
    /// happens to be writing to it at any given moment.
    pub fn from_sender(tx: mpsc::Sender<Payload<T>>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl<T: Send + 'static> RecordSink<T> for BoundedChannelSink<T> {
    async fn emit(&self, payload: Payload<T>) -> Result<(), String> {
        self.tx.send(payload).await.map_err(|_| "downstream receiver dropped".to_string())
    }
}

/// One spout (`src`), one bolt (`agg`), one sink (`out`) — the topology
/// spec.md §8's scenarios are all described against.
pub fn s1_topology() -> Topology {
    Topology::builder()
        .processor("src", OperatorKind::Spout, 1, ["agg"])
        .processor("agg", OperatorKind::Bolt, 1, ["out"])
        .processor("out", OperatorKind::Sink, 1, Vec::<&str>::new())
        .build()
}

pub struct Cluster {
    pub store: Arc<MemoryStore>,
    pub registry: Arc<ProcessorRegistry<MemoryStore>>,
    pub snapshot_store: Arc<InMemorySnapshotStore>,
    pub negotiator_handle: JoinHandle<()>,
}

impl Cluster {
    /// Starts the coordination store's persistent roots and the Negotiator
    /// against `topology`. Spouts/bolts/sinks are started separately by
    /// each scenario so a test can control exactly when each one joins (and
    /// simulate when one leaves).
    pub async fn start(topology: Topology) -> Self {
        let store = Arc::new(MemoryStore::new());
        MasterStateChannel::new(store.clone())
            .ensure_initialized()
            .await
            .expect("initializing /master_state never fails against a fresh MemoryStore");

        let registry = Arc::new(ProcessorRegistry::new(store.clone()));
        let snapshot_store = Arc::new(InMemorySnapshotStore::new());

        let negotiator = Negotiator::new(store.clone(), topology, NEGOTIATOR_CONFIG);
        let negotiator_handle = tokio::spawn(async move {
            let _ = negotiator.run().await;
        });

        Self { store, registry, snapshot_store, negotiator_handle }
    }

    pub async fn master_state_mirror(&self) -> MasterStateMirror {
        inject_master_state(self.store.clone())
            .await
            .expect("subscribing to /master_state never fails against a live MemoryStore")
    }

    /// Path of `id`'s ephemeral registration node, for use with
    /// `MemoryStore::expire_ephemeral` to simulate a crash.
    pub fn living_path(id: &ProcessorId) -> String {
        format!("/living_processors/{}", id.registration_key())
    }
}

/// Spawns a spout reading `records` on partition `p0`, forwarding through a
/// bounded channel a test (or `spawn_bolt`) can drain directly.
pub async fn spawn_spout(
    cluster: &Cluster,
    id: ProcessorId,
    records: Vec<i64>,
) -> (JoinHandle<Result<(), squall_spout::SpoutError>>, mpsc::Receiver<Payload<i64>>) {
    let mirror = cluster.master_state_mirror().await;
    let input = VecInputSource::new("p0", records);
    let (sink, rx) = BoundedChannelSink::new();
    let spout = SpoutRuntime::new(id, cluster.registry.clone(), mirror, input, sink, SPOUT_CONFIG);
    (tokio::spawn(spout.run()), rx)
}

/// Spawns a bolt summing whatever arrives on `rx`, forwarding through
/// another bounded channel.
pub async fn spawn_bolt(
    cluster: &Cluster,
    id: ProcessorId,
    rx: mpsc::Receiver<Payload<i64>>,
) -> (JoinHandle<Result<(), squall_bolt::BoltError>>, mpsc::Receiver<Payload<i64>>) {
    let mirror = cluster.master_state_mirror().await;
    let (sink, out_rx) = BoundedChannelSink::new();
    let bolt = BoltRuntime::new(
        id,
        cluster.registry.clone(),
        mirror,
        rx,
        sink,
        cluster.snapshot_store.clone(),
        SummingBolt::default(),
    );
    (tokio::spawn(bolt.run()), out_rx)
}

pub async fn register_sink(cluster: &Cluster, id: ProcessorId) {
    cluster
        .registry
        .register(&id, ProcessorState::SinkRunning)
        .await
        .expect("registering a sink never fails against a live MemoryStore");
}

pub fn src0() -> ProcessorId {
    ProcessorId::new("src", 0)
}

pub fn src1() -> ProcessorId {
    ProcessorId::new("src", 1)
}

pub fn agg0() -> ProcessorId {
    ProcessorId::new("agg", 0)
}

pub fn agg1() -> ProcessorId {
    ProcessorId::new("agg", 1)
}

pub fn out0() -> ProcessorId {
    ProcessorId::new("out", 0)
}
