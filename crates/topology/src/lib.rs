// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! squall-topology: the static, read-only description of a topology's
//! operators, parallelism, and downstream routing (spec.md §4.7). Every
//! processor in a cluster loads the same `Topology` value; it never changes
//! for the lifetime of a run.

pub mod error;
pub mod route;
pub mod topology;

pub use error::TopologyError;
pub use route::RoutingKey;
pub use topology::{OperatorKind, ProcessorSpec, Topology, TopologyBuilder};
