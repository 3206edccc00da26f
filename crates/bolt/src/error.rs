// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use squall_cluster::ClusterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoltError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("snapshot store failed: {0}")]
    SnapshotStore(String),

    #[error("downstream sink failed: {0}")]
    Sink(String),

    #[error("could not decode stored bolt state: {0}")]
    MalformedState(String),
}
