// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `squall run-processors --topology <file> <id>...`: start one or more
//! real, networked processors from a `squall.toml`-declared topology
//! (spec.md §6 CLI surface). Unlike `run-sample`, every bolt/sink binds a
//! real TCP listener at its configured address and every spout/bolt ships
//! output through `squall-transport`'s pooled shuffle connections — this is
//! the CLI surface a multi-process (or multi-host) deployment actually
//! runs.

use crate::bolt_logic::{NullSink, PassthroughBolt};
use crate::config::FileConfig;
use crate::exit_error::ExitError;
use crate::input_source::FileLineInputSource;
use squall_bolt::snapshot::InMemorySnapshotStore;
use squall_bolt::BoltRuntime;
use squall_cluster::{inject_master_state, MasterStateChannel, ProcessorRegistry};
use squall_core::{ProcessorId, ProcessorState};
use squall_negotiator::{Negotiator, NegotiatorConfig};
use squall_spout::{SpoutConfig, SpoutRuntime};
use squall_store::{CoordinationStore, EtcdStore, MemoryStore};
use squall_topology::{OperatorKind, Topology};
use squall_transport::{serve, ConnectionPool, ShuffleSink};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Which coordination-store backend this run connects to. Kept as two
/// concrete variants rather than one `Arc<dyn CoordinationStore>` because
/// every collaborator downstream (`ProcessorRegistry<S>`, `Negotiator<S>`,
/// `SpoutRuntime`/`BoltRuntime`) is generic over a `Sized` store type.
pub enum StoreHandle {
    Memory(Arc<MemoryStore>),
    Etcd(Arc<EtcdStore>),
}

impl StoreHandle {
    /// A type-erased handle, for callers (`zk-init`, `zk-show`) that only
    /// ever call `CoordinationStore` methods directly and never need the
    /// concrete type.
    pub fn as_dyn(&self) -> Arc<dyn CoordinationStore> {
        match self {
            Self::Memory(store) => store.clone() as Arc<dyn CoordinationStore>,
            Self::Etcd(store) => store.clone() as Arc<dyn CoordinationStore>,
        }
    }
}

pub struct RunProcessorsArgs {
    pub config: FileConfig,
    pub ids: Vec<String>,
    pub store: StoreHandle,
    pub input_file: Option<PathBuf>,
}

pub async fn run(args: RunProcessorsArgs) -> Result<(), ExitError> {
    let topology = Arc::new(args.config.build_topology());
    match args.store {
        StoreHandle::Memory(store) => run_for_store(store, topology, args.ids, args.input_file).await,
        StoreHandle::Etcd(store) => run_for_store(store, topology, args.ids, args.input_file).await,
    }
}

async fn run_for_store<S: CoordinationStore>(
    store: Arc<S>,
    topology: Arc<Topology>,
    ids: Vec<String>,
    input_file: Option<PathBuf>,
) -> Result<(), ExitError> {
    if ids.is_empty() {
        return Err(ExitError::fatal("run-processors requires at least one <id>"));
    }

    MasterStateChannel::new(store.clone())
        .ensure_initialized()
        .await
        .map_err(|e| ExitError::fatal(format!("failed to initialize cluster: {e}")))?;
    let registry = Arc::new(ProcessorRegistry::new(store.clone()));
    let pool = Arc::new(ConnectionPool::new());
    let snapshot_store = Arc::new(InMemorySnapshotStore::new());

    let mut handles = Vec::with_capacity(ids.len());
    for raw_id in ids {
        if raw_id == "negotiator" || raw_id == "negotiator-0" {
            let negotiator = Negotiator::new(store.clone(), (*topology).clone(), NegotiatorConfig::default());
            handles.push(tokio::spawn(
                async move { negotiator.run().await.map_err(|e| format!("negotiator: {e}")) },
            ));
            continue;
        }

        let id = ProcessorId::parse_registration_key(&raw_id).ok_or_else(|| {
            ExitError::fatal(format!("malformed processor id {raw_id:?}, expected <name>-<instance>"))
        })?;
        let kind =
            topology.lookup_processor(&id.name).map_err(|e| ExitError::fatal(format!("{raw_id}: {e}")))?.kind;

        let store = store.clone();
        let topology = topology.clone();
        let registry = registry.clone();
        let pool = pool.clone();
        let snapshot_store = snapshot_store.clone();
        let input_file = input_file.clone();

        handles.push(tokio::spawn(run_one(id, kind, store, topology, registry, pool, snapshot_store, input_file)));
    }

    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(message)) => return Err(ExitError::fatal(message)),
            Err(join_err) => return Err(ExitError::fatal(format!("processor task panicked: {join_err}"))),
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_one<S: CoordinationStore>(
    id: ProcessorId,
    kind: OperatorKind,
    store: Arc<S>,
    topology: Arc<Topology>,
    registry: Arc<ProcessorRegistry<S>>,
    pool: Arc<ConnectionPool>,
    snapshot_store: Arc<InMemorySnapshotStore>,
    input_file: Option<PathBuf>,
) -> Result<(), String> {
    match kind {
        OperatorKind::Spout => run_spout(id, store, topology, registry, pool, input_file).await,
        OperatorKind::Bolt => run_bolt(id, store, topology, registry, pool, snapshot_store).await,
        OperatorKind::Sink => run_sink(id, topology, registry).await,
    }
}

async fn run_spout<S: CoordinationStore>(
    id: ProcessorId,
    store: Arc<S>,
    topology: Arc<Topology>,
    registry: Arc<ProcessorRegistry<S>>,
    pool: Arc<ConnectionPool>,
    input_file: Option<PathBuf>,
) -> Result<(), String> {
    let id_string = id.to_string();
    let path = input_file.ok_or_else(|| format!("{id_string}: a spout requires --file <path>"))?;
    let input = FileLineInputSource::open(id.name.as_str(), &path)
        .map_err(|e| format!("{id_string}: failed to open {}: {e}", path.display()))?;
    let mirror = inject_master_state(store).await.map_err(|e| format!("{id_string}: {e}"))?;
    let sink = ShuffleSink::<String>::new(topology, id.name.as_str(), pool);

    info!(processor = %id_string, file = %path.display(), "starting spout");
    let spout = SpoutRuntime::new(id, registry, mirror, input, sink, SpoutConfig::default());
    spout.run().await.map_err(|e| format!("{id_string}: {e}"))
}

async fn run_bolt<S: CoordinationStore>(
    id: ProcessorId,
    store: Arc<S>,
    topology: Arc<Topology>,
    registry: Arc<ProcessorRegistry<S>>,
    pool: Arc<ConnectionPool>,
    snapshot_store: Arc<InMemorySnapshotStore>,
) -> Result<(), String> {
    let id_string = id.to_string();
    let socket = shuffle_address(&topology, &id_string, &id.name, id.instance)?;
    let (tx, rx) = mpsc::channel(256);
    serve::<String>(socket, tx).await.map_err(|e| format!("{id_string}: failed to bind shuffle listener: {e}"))?;

    let mirror = inject_master_state(store).await.map_err(|e| format!("{id_string}: {e}"))?;
    let has_downstreams =
        !topology.downstreams(&id.name).map_err(|e| format!("{id_string}: {e}"))?.is_empty();

    info!(processor = %id_string, %socket, "starting bolt");
    if has_downstreams {
        let sink = ShuffleSink::<String>::new(topology, id.name.as_str(), pool);
        let bolt = BoltRuntime::new(id, registry, mirror, rx, sink, snapshot_store, PassthroughBolt::default());
        bolt.run().await.map_err(|e| format!("{id_string}: {e}"))
    } else {
        let bolt = BoltRuntime::new(id, registry, mirror, rx, NullSink, snapshot_store, PassthroughBolt::default());
        bolt.run().await.map_err(|e| format!("{id_string}: {e}"))
    }
}

async fn run_sink<S: CoordinationStore>(
    id: ProcessorId,
    topology: Arc<Topology>,
    registry: Arc<ProcessorRegistry<S>>,
) -> Result<(), String> {
    let id_string = id.to_string();
    let socket = shuffle_address(&topology, &id_string, &id.name, id.instance)?;

    let (tx, mut rx) = mpsc::channel::<squall_core::Payload<String>>(256);
    serve::<String>(socket, tx).await.map_err(|e| format!("{id_string}: failed to bind shuffle listener: {e}"))?;

    registry
        .register(&id, ProcessorState::SinkRunning)
        .await
        .map_err(|e| format!("{id_string}: {e}"))?;

    info!(processor = %id_string, %socket, "starting sink");
    while let Some(payload) = rx.recv().await {
        println!("squall: {id_string} <- {} @ {}", payload.tuple, payload.clock);
    }
    Ok(())
}

fn shuffle_address(
    topology: &Topology,
    id_string: &str,
    name: &str,
    instance: u32,
) -> Result<SocketAddr, String> {
    let address = topology.address_for(name, instance).map_err(|e| format!("{id_string}: {e}"))?;
    format!("{}:{}", address.host, address.port)
        .parse()
        .map_err(|e| format!("{id_string}: malformed address {}:{}: {e}", address.host, address.port))
}
