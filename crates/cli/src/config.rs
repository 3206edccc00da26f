// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `squall.toml`: the machine-readable form of spec.md §4.7's static
//! `processors`/`addresses` tables, plus the coordination-store endpoint and
//! the Negotiator's throttle knobs (spec.md §6 "ambient stack" — config).

use anyhow::{Context, Result};
use serde::Deserialize;
use squall_negotiator::NegotiatorConfig;
use squall_store::ConnectOptions;
use squall_topology::{OperatorKind, Topology};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub negotiator: NegotiatorToml,
    #[serde(default, rename = "processor")]
    pub processors: Vec<ProcessorToml>,
    #[serde(default, rename = "address")]
    pub addresses: Vec<AddressToml>,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
}

fn default_endpoints() -> Vec<String> {
    vec!["127.0.0.1:2379".to_string()]
}

fn default_session_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { endpoints: default_endpoints(), session_timeout_secs: default_session_timeout_secs() }
    }
}

impl StoreConfig {
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            endpoints: self.endpoints.clone(),
            session_timeout: Duration::from_secs(self.session_timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NegotiatorToml {
    #[serde(default = "default_zk_throttle_ms")]
    pub zk_throttle_ms: u64,
    #[serde(default = "default_snapshot_throttle_secs")]
    pub snapshot_throttle_secs: u64,
}

fn default_zk_throttle_ms() -> u64 {
    200
}

fn default_snapshot_throttle_secs() -> u64 {
    10
}

impl Default for NegotiatorToml {
    fn default() -> Self {
        Self { zk_throttle_ms: default_zk_throttle_ms(), snapshot_throttle_secs: default_snapshot_throttle_secs() }
    }
}

impl NegotiatorToml {
    pub fn to_config(&self) -> NegotiatorConfig {
        NegotiatorConfig {
            zk_throttle: Duration::from_millis(self.zk_throttle_ms),
            snapshot_throttle: Duration::from_secs(self.snapshot_throttle_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProcessorToml {
    pub name: String,
    pub kind: ProcessorKindToml,
    pub parallelism: u32,
    #[serde(default)]
    pub downstreams: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorKindToml {
    Spout,
    Bolt,
    Sink,
}

impl From<ProcessorKindToml> for OperatorKind {
    fn from(kind: ProcessorKindToml) -> Self {
        match kind {
            ProcessorKindToml::Spout => OperatorKind::Spout,
            ProcessorKindToml::Bolt => OperatorKind::Bolt,
            ProcessorKindToml::Sink => OperatorKind::Sink,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddressToml {
    pub name: String,
    pub instance: u32,
    pub host: String,
    pub port: u16,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read topology file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse topology file {}", path.display()))
    }

    pub fn build_topology(&self) -> Topology {
        let mut builder = Topology::builder();
        for p in &self.processors {
            builder = builder.processor(p.name.as_str(), p.kind.into(), p.parallelism, p.downstreams.iter().map(String::as_str));
        }
        for a in &self.addresses {
            builder = builder.address(a.name.as_str(), a.instance, a.host.as_str(), a.port);
        }
        builder.build()
    }
}
