// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from the shuffle transport: connecting, framing, and routing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {0}: {1}")]
    Connect(String, std::io::Error),

    #[error("connection to {0} is closed")]
    ConnectionClosed(String),

    #[error("malformed shuffle line: {0}")]
    Framing(String),

    #[error("failed to (de)serialize payload: {0}")]
    Codec(#[from] serde_json::Error),

    #[error(transparent)]
    Topology(#[from] squall_topology::TopologyError),

    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
}
