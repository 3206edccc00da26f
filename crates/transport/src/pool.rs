// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connections are pooled per `(host, port)` and reused for the lifetime of
//! the upstream process (spec.md §6). Each pooled connection is a single
//! writer task fed by an unbounded channel, so callers never contend on the
//! socket directly — they just hand a line to the pool and move on.

use crate::error::TransportError;
use futures_util::SinkExt;
use std::collections::HashMap;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::warn;

type Key = (String, u16);

pub struct ConnectionPool {
    connections: Mutex<HashMap<Key, mpsc::UnboundedSender<String>>>,
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionPool {
    pub fn new() -> Self {
        Self { connections: Mutex::new(HashMap::new()) }
    }

    /// Sends `line` to `(host, port)`, connecting (and caching the
    /// connection) on first use. A previously-cached connection whose
    /// writer task has since died is evicted and reconnected transparently.
    pub async fn send_line(&self, host: &str, port: u16, line: String) -> Result<(), TransportError> {
        let key = (host.to_string(), port);

        let sender = {
            let mut connections = self.connections.lock().await;
            match connections.get(&key) {
                Some(tx) if !tx.is_closed() => tx.clone(),
                _ => {
                    let tx = Self::connect(host, port).await?;
                    connections.insert(key.clone(), tx.clone());
                    tx
                }
            }
        };

        sender.send(line).map_err(|_| TransportError::ConnectionClosed(format!("{host}:{port}")))
    }

    async fn connect(host: &str, port: u16) -> Result<mpsc::UnboundedSender<String>, TransportError> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| TransportError::Connect(format!("{host}:{port}"), e))?;
        let (tx, rx) = mpsc::unbounded_channel();
        let addr = format!("{host}:{port}");
        tokio::spawn(Self::writer_task(stream, rx, addr));
        Ok(tx)
    }

    async fn writer_task(stream: TcpStream, mut rx: mpsc::UnboundedReceiver<String>, addr: String) {
        let mut framed = Framed::new(stream, LinesCodec::new());
        while let Some(line) = rx.recv().await {
            if let Err(err) = framed.send(line).await {
                warn!(%addr, error = %err, "shuffle connection write failed, dropping");
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
