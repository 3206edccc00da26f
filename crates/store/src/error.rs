// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-level error taxonomy (spec.md §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The path already exists; only meaningful for `register_ephemeral`
    /// and optionally `create_persistent` (idempotent creation is the
    /// caller's choice, see [`crate::CoordinationStore::create_persistent`]).
    #[error("path already exists: {0}")]
    AlreadyExists(String),

    /// The path does not exist where the caller's invariant demanded it be
    /// present (e.g. `get`/`set`/`children` on a never-created node).
    #[error("unexpected missing path: {0}")]
    UnexpectedStoreError(String),

    /// The coordination session was lost but may still be recoverable by
    /// reconnecting (network blip, server restart). Surfaced on any
    /// in-flight call.
    #[error("connection lost: {0}")]
    ConnectionError(String),

    /// The session expired outright (lease/keep-alive failed permanently).
    /// Fatal: the owning processor must terminate.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// A value in the store could not be interpreted by the caller.
    #[error("malformed value at {path}: {reason}")]
    MalformedValue { path: String, reason: String },
}

impl StoreError {
    /// Whether the caller should treat this as fatal (terminate the owning
    /// processor) vs. potentially recoverable by retrying the call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::SessionExpired(_))
    }
}
