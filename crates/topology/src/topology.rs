// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static tables per spec.md §4.7: `processors: name -> {parallelism,
//! downstreams}`, `addresses: (name, instance) -> (host, port)`.

use crate::error::TopologyError;
use crate::route::RoutingKey;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use squall_core::ProcessorId;

/// What role a named operator plays. Spouts source records, bolts transform
/// and hold snapshot-able state, sinks are terminal and stateless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Spout,
    Bolt,
    Sink,
}

/// One entry of the `processors` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorSpec {
    pub kind: OperatorKind,
    pub parallelism: u32,
    #[serde(default)]
    pub downstreams: Vec<SmolStr>,
}

/// The `(host, port)` half of the `addresses` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub host: SmolStr,
    pub port: u16,
}

/// A complete, static topology description, shared read-only by every
/// processor in the cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    processors: IndexMap<SmolStr, ProcessorSpec>,
    addresses: IndexMap<(SmolStr, u32), Address>,
}

impl Topology {
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::default()
    }

    pub fn lookup_processor(&self, name: &str) -> Result<&ProcessorSpec, TopologyError> {
        self.processors.get(name).ok_or_else(|| TopologyError::UnknownProcessor(name.into()))
    }

    pub fn parallelism(&self, name: &str) -> Result<u32, TopologyError> {
        Ok(self.lookup_processor(name)?.parallelism)
    }

    pub fn downstreams(&self, name: &str) -> Result<&[SmolStr], TopologyError> {
        Ok(&self.lookup_processor(name)?.downstreams)
    }

    pub fn address_for(&self, name: &str, instance: u32) -> Result<&Address, TopologyError> {
        let spec = self.lookup_processor(name)?;
        if instance >= spec.parallelism {
            return Err(TopologyError::InstanceOutOfRange {
                name: name.into(),
                instance,
                parallelism: spec.parallelism,
            });
        }
        self.addresses
            .get(&(SmolStr::from(name), instance))
            .ok_or_else(|| TopologyError::MissingAddress { name: name.into(), instance })
    }

    /// All processor names whose kind is `Spout`.
    pub fn spout_ids(&self) -> Vec<SmolStr> {
        self.names_of_kind(OperatorKind::Spout)
    }

    /// All processor names whose kind is `Bolt`.
    pub fn bolt_ids(&self) -> Vec<SmolStr> {
        self.names_of_kind(OperatorKind::Bolt)
    }

    /// All processor names whose kind is `Sink`.
    pub fn sink_ids(&self) -> Vec<SmolStr> {
        self.names_of_kind(OperatorKind::Sink)
    }

    fn names_of_kind(&self, kind: OperatorKind) -> Vec<SmolStr> {
        self.processors
            .iter()
            .filter(|(_, spec)| spec.kind == kind)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Sum of parallelism across every processor in the topology.
    pub fn num_processors(&self) -> u32 {
        self.processors.values().map(|spec| spec.parallelism).sum()
    }

    /// Every `(name, instance)` pair the topology knows about, in
    /// declaration order — the set of processors a Negotiator expects to see
    /// register.
    pub fn all_processor_ids(&self) -> Vec<ProcessorId> {
        self.processor_ids_of_kind(None)
    }

    /// Every `(name, instance)` pair belonging to a spout — the set the
    /// Negotiator's snapshot-driver waits on for `SpoutPaused`/rewind
    /// confirmation (spec.md §4.6 steps 5 and 2 of the flow loop).
    pub fn spout_processor_ids(&self) -> Vec<ProcessorId> {
        self.processor_ids_of_kind(Some(OperatorKind::Spout))
    }

    /// Every `(name, instance)` pair belonging to a bolt — the set the
    /// Negotiator waits on for `BoltLoaded`/`BoltSaved` (spec.md §4.6 steps
    /// 2 and 4 of the flow loop).
    pub fn bolt_processor_ids(&self) -> Vec<ProcessorId> {
        self.processor_ids_of_kind(Some(OperatorKind::Bolt))
    }

    fn processor_ids_of_kind(&self, kind: Option<OperatorKind>) -> Vec<ProcessorId> {
        self.processors
            .iter()
            .filter(|(_, spec)| match kind {
                Some(k) => spec.kind == k,
                None => true,
            })
            .flat_map(|(name, spec)| {
                (0..spec.parallelism).map(move |instance| ProcessorId::new(name.as_str(), instance))
            })
            .collect()
    }

    /// Stateless shuffle routing: for `upstream_name`'s payload keyed by
    /// `key`, resolve which downstream instance(s) should receive it — one
    /// `ProcessorId` per downstream operator name, each chosen by hashing
    /// `key` modulo that downstream's parallelism (spec.md §4.7, resolved
    /// per the keyed-partitioner REDESIGN FLAG).
    pub fn downstream_addresses(
        &self,
        upstream_name: &str,
        key: &RoutingKey,
    ) -> Result<Vec<(ProcessorId, Address)>, TopologyError> {
        let downstreams = self.downstreams(upstream_name)?;
        if downstreams.is_empty() {
            return Err(TopologyError::NoDownstreams { name: upstream_name.into() });
        }
        downstreams
            .iter()
            .map(|downstream| {
                let parallelism = self.parallelism(downstream)?;
                let instance = key.route(parallelism);
                let address = self.address_for(downstream, instance)?.clone();
                Ok((ProcessorId::new(downstream.as_str(), instance), address))
            })
            .collect()
    }
}

/// Builds a [`Topology`] programmatically — used by tests and by
/// `squall-cli` when assembling one from a parsed `squall.toml`.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    processors: IndexMap<SmolStr, ProcessorSpec>,
    addresses: IndexMap<(SmolStr, u32), Address>,
}

impl TopologyBuilder {
    pub fn processor(
        mut self,
        name: impl Into<SmolStr>,
        kind: OperatorKind,
        parallelism: u32,
        downstreams: impl IntoIterator<Item = impl Into<SmolStr>>,
    ) -> Self {
        self.processors.insert(
            name.into(),
            ProcessorSpec {
                kind,
                parallelism,
                downstreams: downstreams.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    pub fn address(mut self, name: impl Into<SmolStr>, instance: u32, host: impl Into<SmolStr>, port: u16) -> Self {
        self.addresses.insert((name.into(), instance), Address { host: host.into(), port });
        self
    }

    pub fn build(self) -> Topology {
        Topology { processors: self.processors, addresses: self.addresses }
    }
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
