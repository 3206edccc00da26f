// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("unknown processor: {0}")]
    UnknownProcessor(SmolStr),

    #[error("instance {instance} out of range for {name} (parallelism {parallelism})")]
    InstanceOutOfRange { name: SmolStr, instance: u32, parallelism: u32 },

    #[error("no address registered for {name}/{instance}")]
    MissingAddress { name: SmolStr, instance: u32 },

    #[error("{name} has no downstreams to route to")]
    NoDownstreams { name: SmolStr },
}
