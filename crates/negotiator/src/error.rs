// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Negotiator error taxonomy (spec.md §7).

use squall_core::{Clock, ProcessorId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NegotiatorError {
    #[error(transparent)]
    Cluster(#[from] squall_cluster::ClusterError),

    /// Bolts reported `BoltLoaded` at divergent Clocks at startup. Fatal for
    /// the Negotiator (spec.md §4.6 step 3): the cluster operator must
    /// intervene, so this is never retried.
    #[error("bolts loaded at divergent clocks: {0:?}")]
    BadStartupError(Vec<(ProcessorId, Clock)>),

    /// Bolts reported `BoltSaved` at divergent Clocks for the same cut
    /// (spec.md §4.6 flow loop step 4).
    #[error("bolts saved at divergent clocks: {0:?}")]
    BadClusterStateError(Vec<(ProcessorId, Clock)>),

    /// The membership watch on `/living_processors` closed — equivalent to
    /// a coordination session loss for the Negotiator itself.
    #[error("membership watch closed")]
    MembershipWatchClosed,
}
