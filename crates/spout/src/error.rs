// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use squall_cluster::ClusterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpoutError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// The input source (I/O, broker client) failed. Per spec.md §4.4:
    /// "a fatal error (I/O, session expiry) propagates, ephemerals vanish,
    /// and the Negotiator's children-watch observes it" — this always
    /// terminates `SpoutRuntime::run`.
    #[error("input source failed: {0}")]
    InputSource(String),

    /// The downstream sink rejected or failed to deliver a record.
    #[error("record sink failed: {0}")]
    Sink(String),
}
