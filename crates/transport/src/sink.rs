// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The real [`RecordSink`] a spout or bolt writes through: resolve the
//! shuffle target(s) from the topology, frame the payload, hand it to the
//! connection pool.

use crate::codec::encode_payload;
use crate::error::TransportError;
use crate::pool::ConnectionPool;
use async_trait::async_trait;
use serde::Serialize;
use smol_str::SmolStr;
use squall_core::Payload;
use squall_spout::RecordSink;
use squall_topology::{RoutingKey, Topology};
use std::sync::Arc;

/// `squall_core::Payload<T>` carries no routing key of its own (the tuple
/// formula layer that would own partitioning is out of core scope,
/// `Payload`'s own doc comment); a tuple type that flows through the
/// shuffle transport implements this to say how it is partitioned.
pub trait Keyed {
    fn routing_key(&self) -> RoutingKey;
}

impl Keyed for i64 {
    fn routing_key(&self) -> RoutingKey {
        RoutingKey::from_str(&self.to_string())
    }
}

impl Keyed for String {
    fn routing_key(&self) -> RoutingKey {
        RoutingKey::from_str(self)
    }
}

pub struct ShuffleSink<T> {
    topology: Arc<Topology>,
    upstream_name: SmolStr,
    pool: Arc<ConnectionPool>,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<T> ShuffleSink<T> {
    pub fn new(topology: Arc<Topology>, upstream_name: impl Into<SmolStr>, pool: Arc<ConnectionPool>) -> Self {
        Self { topology, upstream_name: upstream_name.into(), pool, _marker: std::marker::PhantomData }
    }
}

#[async_trait]
impl<T> RecordSink<T> for ShuffleSink<T>
where
    T: Serialize + Keyed + Send + Sync + 'static,
{
    async fn emit(&self, payload: Payload<T>) -> Result<(), String> {
        self.emit_inner(payload).await.map_err(|e| e.to_string())
    }
}

impl<T: Serialize + Keyed + Send + Sync + 'static> ShuffleSink<T> {
    async fn emit_inner(&self, payload: Payload<T>) -> Result<(), TransportError> {
        let key = payload.tuple.routing_key();
        let targets = self.topology.downstream_addresses(&self.upstream_name, &key)?;
        let line = encode_payload(&payload)?;

        for (_processor_id, address) in targets {
            self.pool.send_line(&address.host, address.port, line.clone()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
