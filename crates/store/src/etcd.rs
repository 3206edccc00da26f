// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The etcd-backed `CoordinationStore`.
//!
//! etcd has no native "ephemeral node" concept; this builds one out of a
//! lease (`lease_grant` + a background `lease_keep_alive` task) attached to
//! the key on `put`. When the keep-alive stream ends — expired TTL, broker
//! restart the client can't reconnect to — the lease is gone and so is the
//! key, which is exactly the failure mode spec.md §4.1 wants from ephemeral
//! registration. "Children of a path" has no native analogue either; it is
//! modeled as a key prefix (`{path}/`) and `children()` strips the prefix
//! back off.

use crate::error::StoreError;
use crate::store::{ConnectOptions, CoordinationStore};
use crate::watch::{ChildrenWatch, DataWatch};
use async_trait::async_trait;
use etcd_client::{
    Client, Compare, CompareOp, EventType, GetOptions, PutOptions, Txn, TxnOp, WatchOptions,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A connected etcd session.
///
/// Holds the client plus a background task per registered ephemeral node
/// (lease keep-alive). Dropping the store does not revoke leases outright —
/// callers that want deterministic cleanup on shutdown should let the
/// keep-alive task die naturally (process exit) or call `revoke` through a
/// fresh connection, mirroring how a real coordination-service client treats
/// session teardown as "stop renewing" rather than "synchronously delete".
#[derive(Clone)]
pub struct EtcdStore {
    client: Client,
    lease_ttl_secs: i64,
}

impl EtcdStore {
    /// Dial the given endpoints and establish a session.
    pub async fn connect(opts: &ConnectOptions) -> Result<Self, StoreError> {
        let client = Client::connect(opts.endpoints.clone(), None)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        Ok(Self { client, lease_ttl_secs: opts.session_timeout.as_secs().max(1) as i64 })
    }

    async fn grant_lease(&self) -> Result<i64, StoreError> {
        let resp = self
            .client
            .clone()
            .lease_grant(self.lease_ttl_secs, None)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        Ok(resp.id())
    }

    /// Spawns the keep-alive loop for `lease_id`. The task runs until the
    /// keep-alive stream itself errors out (connection permanently lost) —
    /// at that point the lease will expire server-side on its own and the
    /// ephemeral key disappears, which is the intended "session expired"
    /// behavior.
    fn spawn_keep_alive(&self, lease_id: i64, path: String) {
        let mut client = self.client.clone();
        let ttl_secs = self.lease_ttl_secs;
        tokio::spawn(async move {
            let (mut keeper, mut stream) = match client.lease_keep_alive(lease_id).await {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(%path, error = %e, "failed to start lease keep-alive");
                    return;
                }
            };
            let period = std::time::Duration::from_secs((ttl_secs as u64) / 3 + 1);
            loop {
                tokio::time::sleep(period).await;
                if keeper.keep_alive().await.is_err() {
                    warn!(%path, "lease keep-alive send failed, session will expire");
                    return;
                }
                match stream.message().await {
                    Ok(Some(_)) => debug!(%path, "lease renewed"),
                    Ok(None) | Err(_) => {
                        warn!(%path, "lease keep-alive stream closed, session expired");
                        return;
                    }
                }
            }
        });
    }
}

#[async_trait]
impl CoordinationStore for EtcdStore {
    async fn register_ephemeral(&self, path: &str, payload: Vec<u8>) -> Result<(), StoreError> {
        let lease_id = self.grant_lease().await?;
        let txn = Txn::new()
            .when(vec![Compare::create_revision(path, CompareOp::Equal, 0)])
            .and_then(vec![TxnOp::put(path, payload, Some(PutOptions::new().with_lease(lease_id)))]);
        let resp = self
            .client
            .clone()
            .txn(txn)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        if !resp.succeeded() {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        self.spawn_keep_alive(lease_id, path.to_string());
        Ok(())
    }

    async fn create_persistent(&self, path: &str, payload: Vec<u8>) -> Result<(), StoreError> {
        let txn = Txn::new()
            .when(vec![Compare::create_revision(path, CompareOp::Equal, 0)])
            .and_then(vec![TxnOp::put(path, payload, None)]);
        let resp = self
            .client
            .clone()
            .txn(txn)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        if !resp.succeeded() {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        Ok(())
    }

    async fn set(&self, path: &str, payload: Vec<u8>) -> Result<(), StoreError> {
        let existing = self.get(path).await?;
        if existing.is_none() {
            return Err(StoreError::UnexpectedStoreError(path.to_string()));
        }
        self.client
            .clone()
            .put(path, payload, None)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let resp = self
            .client
            .clone()
            .get(path, None)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        Ok(resp.kvs().first().map(|kv| kv.value().to_vec()))
    }

    async fn children(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let resp = self
            .client
            .clone()
            .get(prefix.as_str(), Some(GetOptions::new().with_prefix()))
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        let mut leaves: Vec<String> = resp
            .kvs()
            .iter()
            .filter_map(|kv| {
                let key = std::str::from_utf8(kv.key()).ok()?;
                let rest = key.strip_prefix(&prefix)?;
                if rest.is_empty() || rest.contains('/') {
                    None
                } else {
                    Some(rest.to_string())
                }
            })
            .collect();
        leaves.sort();
        leaves.dedup();
        Ok(leaves)
    }

    async fn watch_children(&self, path: &str) -> Result<ChildrenWatch, StoreError> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let current = self.children(path).await?;
        let (tx, rx) = mpsc::channel(32);
        let _ = tx.try_send(current.clone());

        let mut client = self.client.clone();
        let watch_prefix = prefix.clone();
        tokio::spawn(async move {
            let (_watcher, mut stream) = match client
                .watch(watch_prefix.as_str(), Some(WatchOptions::new().with_prefix()))
                .await
            {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(path = %watch_prefix, error = %e, "failed to start children watch");
                    return;
                }
            };
            let mut known = current.into_iter().collect::<std::collections::BTreeSet<_>>();
            while let Ok(Some(resp)) = stream.message().await {
                for event in resp.events() {
                    let Some(kv) = event.kv() else { continue };
                    let Ok(key) = std::str::from_utf8(kv.key()) else { continue };
                    let Some(rest) = key.strip_prefix(&watch_prefix) else { continue };
                    if rest.is_empty() || rest.contains('/') {
                        continue;
                    }
                    match event.event_type() {
                        EventType::Put => {
                            known.insert(rest.to_string());
                        }
                        EventType::Delete => {
                            known.remove(rest);
                        }
                    }
                }
                if tx.send(known.iter().cloned().collect()).await.is_err() {
                    return;
                }
            }
        });

        Ok(ChildrenWatch::new(rx))
    }

    async fn watch_data(&self, path: &str) -> Result<DataWatch, StoreError> {
        let current = self.get(path).await?;
        let (tx, rx) = mpsc::channel(32);
        if let Some(current) = current {
            let _ = tx.try_send(current);
        }

        let mut client = self.client.clone();
        let watch_path = path.to_string();
        tokio::spawn(async move {
            let (_watcher, mut stream) = match client.watch(watch_path.as_str(), None).await {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(path = %watch_path, error = %e, "failed to start data watch");
                    return;
                }
            };
            while let Ok(Some(resp)) = stream.message().await {
                for event in resp.events() {
                    if event.event_type() != EventType::Put {
                        continue;
                    }
                    let Some(kv) = event.kv() else { continue };
                    if tx.send(kv.value().to_vec()).await.is_err() {
                        return;
                    }
                }
            }
        });

        Ok(DataWatch::new(rx))
    }
}
