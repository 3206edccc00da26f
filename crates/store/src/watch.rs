// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch subscriptions.
//!
//! Each subscription delivers on a single ordered channel; re-arming after a
//! fire is the store client's responsibility, not the caller's — callers
//! just loop on `next()`. A `None` return means the watch itself died
//! (connection lost) and must be re-established via a fresh
//! `watch_children`/`watch_data` call.

use tokio::sync::mpsc;

/// A live subscription to a path's children set.
pub struct ChildrenWatch {
    rx: mpsc::Receiver<Vec<String>>,
}

impl ChildrenWatch {
    pub fn new(rx: mpsc::Receiver<Vec<String>>) -> Self {
        Self { rx }
    }

    pub async fn next(&mut self) -> Option<Vec<String>> {
        self.rx.recv().await
    }
}

/// A live subscription to a single node's raw value.
pub struct DataWatch {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl DataWatch {
    pub fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { rx }
    }

    pub async fn next(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }
}
