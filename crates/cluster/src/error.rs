// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use squall_core::ProcessorId;
use squall_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    /// Ephemeral registration path already existed at registration time
    /// (spec.md §7: fatal for the registering caller).
    #[error("processor {0} is already registered")]
    DuplicateProcessor(ProcessorId),

    /// A child under `/living_processors` could not be parsed back into a
    /// `ProcessorId`, or its value could not be decoded as a
    /// `ProcessorState`.
    #[error("malformed processor entry at {path}: {reason}")]
    MalformedEntry { path: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
