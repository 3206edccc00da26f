// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-process `CoordinationStore`, backing `run-sample`'s local mode and
//! the bulk of the workspace's test suite.
//!
//! Not a test-only stub hidden behind `cfg(test)`: it is a documented,
//! first-class backend, the same way the teacher's `FakeClock` is a real
//! exported type rather than a private test double.

use crate::error::StoreError;
use crate::store::{ConnectOptions, CoordinationStore};
use crate::watch::{ChildrenWatch, DataWatch};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Persistent,
    Ephemeral,
}

struct Node {
    kind: NodeKind,
    payload: Vec<u8>,
}

#[derive(Default)]
struct Tree {
    nodes: BTreeMap<String, Node>,
    children_watchers: BTreeMap<String, Vec<mpsc::Sender<Vec<String>>>>,
    data_watchers: BTreeMap<String, Vec<mpsc::Sender<Vec<u8>>>>,
}

/// A shared, in-process coordination store.
///
/// Clones share the same underlying tree (it is reference-counted), so a
/// `MemoryStore::connect`ed handle per simulated processor still observes
/// every other processor's writes, the way every client of a real
/// coordination service observes the same cluster state.
#[derive(Clone)]
pub struct MemoryStore {
    tree: Arc<Mutex<Tree>>,
}

impl MemoryStore {
    /// A fresh, empty store — use this once per simulated cluster and
    /// `clone()` it for each simulated processor's session.
    pub fn new() -> Self {
        Self { tree: Arc::new(Mutex::new(Tree::default())) }
    }

    /// Simulates the processor's coordination session ending (crash, `drop`
    /// of the owning handle). A no-op if `path` is not an ephemeral node —
    /// session loss never removes persistent state.
    pub fn expire_ephemeral(&self, path: &str) {
        let mut notify = None;
        {
            let mut tree = self.tree.lock();
            let is_ephemeral = tree.nodes.get(path).map(|n| n.kind) == Some(NodeKind::Ephemeral);
            if is_ephemeral {
                tree.nodes.remove(path);
                notify = parent_path(path).map(|p| p.to_string());
            }
        }
        if let Some(parent) = notify {
            self.notify_children(&parent);
        }
    }

    fn notify_children(&self, path: &str) {
        let (senders, current) = {
            let tree = self.tree.lock();
            let current = children_of(&tree.nodes, path);
            (tree.children_watchers.get(path).cloned().unwrap_or_default(), current)
        };
        for sender in senders {
            let _ = sender.try_send(current.clone());
        }
    }

    fn notify_data(&self, path: &str, payload: &[u8]) {
        let senders = {
            let tree = self.tree.lock();
            tree.data_watchers.get(path).cloned().unwrap_or_default()
        };
        for sender in senders {
            let _ = sender.try_send(payload.to_vec());
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parent_path(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit_once('/').map(|(parent, _)| {
        if parent.is_empty() {
            "/"
        } else {
            parent
        }
    })
}

fn children_of(nodes: &BTreeMap<String, Node>, path: &str) -> Vec<String> {
    let prefix = if path.ends_with('/') { path.to_string() } else { format!("{path}/") };
    nodes
        .keys()
        .filter_map(|key| {
            let rest = key.strip_prefix(&prefix)?;
            if rest.is_empty() || rest.contains('/') {
                None
            } else {
                Some(rest.to_string())
            }
        })
        .collect()
}

#[async_trait]
impl CoordinationStore for MemoryStore {
    async fn register_ephemeral(&self, path: &str, payload: Vec<u8>) -> Result<(), StoreError> {
        let parent = {
            let mut tree = self.tree.lock();
            if tree.nodes.contains_key(path) {
                return Err(StoreError::AlreadyExists(path.to_string()));
            }
            tree.nodes.insert(path.to_string(), Node { kind: NodeKind::Ephemeral, payload });
            parent_path(path).map(|p| p.to_string())
        };
        if let Some(parent) = parent {
            self.notify_children(&parent);
        }
        Ok(())
    }

    async fn create_persistent(&self, path: &str, payload: Vec<u8>) -> Result<(), StoreError> {
        let mut tree = self.tree.lock();
        if tree.nodes.contains_key(path) {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        tree.nodes.insert(path.to_string(), Node { kind: NodeKind::Persistent, payload });
        Ok(())
    }

    async fn set(&self, path: &str, payload: Vec<u8>) -> Result<(), StoreError> {
        {
            let mut tree = self.tree.lock();
            let node = tree
                .nodes
                .get_mut(path)
                .ok_or_else(|| StoreError::UnexpectedStoreError(path.to_string()))?;
            node.payload = payload.clone();
        }
        self.notify_data(path, &payload);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let tree = self.tree.lock();
        Ok(tree.nodes.get(path).map(|n| n.payload.clone()))
    }

    async fn children(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let tree = self.tree.lock();
        Ok(children_of(&tree.nodes, path))
    }

    async fn watch_children(&self, path: &str) -> Result<ChildrenWatch, StoreError> {
        let (tx, rx) = mpsc::channel(32);
        let current = {
            let mut tree = self.tree.lock();
            tree.children_watchers.entry(path.to_string()).or_default().push(tx.clone());
            children_of(&tree.nodes, path)
        };
        let _ = tx.try_send(current);
        Ok(ChildrenWatch::new(rx))
    }

    async fn watch_data(&self, path: &str) -> Result<DataWatch, StoreError> {
        let (tx, rx) = mpsc::channel(32);
        let current = {
            let mut tree = self.tree.lock();
            tree.data_watchers.entry(path.to_string()).or_default().push(tx.clone());
            tree.nodes.get(path).map(|n| n.payload.clone())
        };
        if let Some(current) = current {
            let _ = tx.try_send(current);
        }
        Ok(DataWatch::new(rx))
    }
}

/// Satisfies the `connect(opts) -> session` op of spec.md §4.1 for the
/// in-process backend: `ConnectOptions` is accepted for interface symmetry
/// with `EtcdStore` but unused (there is no endpoint to dial).
pub async fn connect(_opts: &ConnectOptions, tree: MemoryStore) -> Result<MemoryStore, StoreError> {
    Ok(tree)
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
