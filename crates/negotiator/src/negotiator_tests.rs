use super::*;
use squall_cluster::{inject_master_state, MasterStateChannel, LIVING_PROCESSORS_PATH};
use squall_core::ProcessorState;
use squall_store::MemoryStore;
use squall_topology::{OperatorKind, Topology};
use std::time::Duration;
use tokio::time::timeout;

const STEP: Duration = Duration::from_secs(2);

fn sample_topology() -> Topology {
    Topology::builder()
        .processor("src", OperatorKind::Spout, 1, ["agg"])
        .processor("agg", OperatorKind::Bolt, 1, ["out"])
        .processor("out", OperatorKind::Sink, 1, Vec::<&str>::new())
        .build()
}

fn fast_config() -> NegotiatorConfig {
    NegotiatorConfig { zk_throttle: Duration::from_millis(2), snapshot_throttle: Duration::from_millis(15) }
}

async fn next(mirror: &mut squall_cluster::MasterStateMirror) -> MasterState {
    timeout(STEP, mirror.changed()).await.expect("master state change").expect("mirror alive")
}

/// spec.md §8 S5: `MasterState` stays `Unavailable` until the full cluster
/// (topology's `num_processors` + the Negotiator itself) has registered.
#[tokio::test]
async fn stays_unavailable_until_the_full_cluster_registers() {
    let store = Arc::new(MemoryStore::new());
    MasterStateChannel::new(store.clone()).ensure_initialized().await.unwrap();
    let mut mirror = inject_master_state(store.clone()).await.unwrap();
    assert_eq!(mirror.current(), MasterState::Unavailable);

    let registry = Arc::new(ProcessorRegistry::new(store.clone()));
    let negotiator = Negotiator::new(store.clone(), sample_topology(), fast_config());
    tokio::spawn(async move {
        let _ = negotiator.run().await;
    });

    // Negotiator alone (1 of 4 expected) re-asserts Unavailable.
    assert_eq!(next(&mut mirror).await, MasterState::Unavailable);

    registry.register(&ProcessorId::new("src", 0), ProcessorState::SpoutRunning).await.unwrap();
    // Still short two processors — every membership event re-asserts Unavailable.
    assert_eq!(next(&mut mirror).await, MasterState::Unavailable);

    registry.register(&ProcessorId::new("out", 0), ProcessorState::SinkRunning).await.unwrap();
    assert_eq!(next(&mut mirror).await, MasterState::Unavailable);

    registry.register(&ProcessorId::new("agg", 0), ProcessorState::BoltRunning).await.unwrap();

    assert_eq!(next(&mut mirror).await, MasterState::Initialization);
}

/// spec.md §8 S6-adjacent: membership dropping below quorum aborts whatever
/// the snapshot-driver was doing and forces `Unavailable`.
#[tokio::test]
async fn membership_drop_cancels_the_driver_and_forces_unavailable() {
    let store = Arc::new(MemoryStore::new());
    MasterStateChannel::new(store.clone()).ensure_initialized().await.unwrap();
    let mut mirror = inject_master_state(store.clone()).await.unwrap();

    let registry = Arc::new(ProcessorRegistry::new(store.clone()));
    let negotiator = Negotiator::new(store.clone(), sample_topology(), fast_config());
    tokio::spawn(async move {
        let _ = negotiator.run().await;
    });
    assert_eq!(next(&mut mirror).await, MasterState::Unavailable);

    let bolt = ProcessorId::new("agg", 0);
    registry.register(&ProcessorId::new("src", 0), ProcessorState::SpoutRunning).await.unwrap();
    registry.register(&ProcessorId::new("out", 0), ProcessorState::SinkRunning).await.unwrap();
    registry.register(&bolt, ProcessorState::BoltRunning).await.unwrap();
    assert_eq!(next(&mut mirror).await, MasterState::Initialization);

    // Kill the bolt mid-flight; the cluster drops below quorum.
    store.expire_ephemeral(&format!("{LIVING_PROCESSORS_PATH}/{}", bolt.registration_key()));

    assert_eq!(next(&mut mirror).await, MasterState::Unavailable);
}
