// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The coordination store capability interface (spec.md §4.1).

use crate::error::StoreError;
use crate::watch::{ChildrenWatch, DataWatch};
use async_trait::async_trait;

/// Connection parameters for [`CoordinationStore::connect`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Endpoint list (e.g. `["127.0.0.1:2379"]` for etcd, ignored by
    /// [`crate::MemoryStore`]).
    pub endpoints: Vec<String>,
    /// Session/lease TTL. A lease keep-alive failure after this window is
    /// fatal (`StoreError::SessionExpired`).
    pub session_timeout: std::time::Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            endpoints: vec!["127.0.0.1:2379".to_string()],
            session_timeout: std::time::Duration::from_secs(10),
        }
    }
}

/// A connected coordination-store session.
///
/// Implementations own automatic reconnection: a transient connection loss
/// surfaces as `StoreError::ConnectionError` on the in-flight call and the
/// implementation retries its background keep-alive/watch machinery
/// internally; only a true session expiry surfaces as
/// `StoreError::SessionExpired`, which callers must treat as fatal.
#[async_trait]
pub trait CoordinationStore: Send + Sync + 'static {
    /// Create an ephemeral node at `path` with the given payload. Fails with
    /// `StoreError::AlreadyExists` if the path exists — the caller decides
    /// whether that's a `DuplicateProcessorError` or something else.
    async fn register_ephemeral(&self, path: &str, payload: Vec<u8>) -> Result<(), StoreError>;

    /// Create a persistent node at `path`. Idempotent "already exists" is
    /// the caller's choice: this always reports `StoreError::AlreadyExists`
    /// on collision, and callers that want idempotence swallow it.
    async fn create_persistent(&self, path: &str, payload: Vec<u8>) -> Result<(), StoreError>;

    /// Overwrite the value at `path`. Fails with
    /// `StoreError::UnexpectedStoreError` if `path` does not exist.
    async fn set(&self, path: &str, payload: Vec<u8>) -> Result<(), StoreError>;

    /// Read the value at `path`, or `None` if it does not exist.
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// List the immediate children of `path` (leaf names, not full paths).
    async fn children(&self, path: &str) -> Result<Vec<String>, StoreError>;

    /// Subscribe to changes in the children set of `path`. The first item
    /// delivered is the current children set, not only future deltas — this
    /// lets a fresh subscriber act on current state without a separate
    /// initial `children()` call racing the subscription's first event.
    async fn watch_children(&self, path: &str) -> Result<ChildrenWatch, StoreError>;

    /// Subscribe to changes in the value at `path`, same current-value-first
    /// semantics as `watch_children`.
    async fn watch_data(&self, path: &str) -> Result<DataWatch, StoreError>;
}
