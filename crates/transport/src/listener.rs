// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The receive side of the shuffle transport: accept connections, decode
//! one `Payload<T>` per line, forward each onto an `mpsc` channel that a
//! `squall-bolt`/sink consumer reads from (mirroring
//! `squall_bolt::BoltRuntime::new`'s own `mpsc::Receiver<Payload<_>>`).

use crate::codec::decode_payload;
use crate::error::TransportError;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use squall_core::Payload;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::warn;

/// Binds `addr` and forwards decoded payloads onto `tx` forever, spawning
/// one task per accepted connection. Returns the socket's actual local
/// address (useful when `addr`'s port is `0`) alongside a handle that
/// resolves once the listener itself stops accepting (normally only if the
/// OS closes the listening socket).
pub async fn serve<T>(
    addr: SocketAddr,
    tx: mpsc::Sender<Payload<T>>,
) -> Result<(SocketAddr, JoinHandle<()>), TransportError>
where
    T: DeserializeOwned + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.map_err(|e| TransportError::Bind(addr.to_string(), e))?;
    let bound = listener.local_addr().map_err(|e| TransportError::Bind(addr.to_string(), e))?;

    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let tx = tx.clone();
                    tokio::spawn(handle_connection(stream, peer, tx));
                }
                Err(err) => {
                    warn!(%addr, error = %err, "shuffle listener accept failed, stopping");
                    return;
                }
            }
        }
    });

    Ok((bound, handle))
}

async fn handle_connection<T>(stream: TcpStream, peer: SocketAddr, tx: mpsc::Sender<Payload<T>>)
where
    T: DeserializeOwned + Send + 'static,
{
    let mut framed = Framed::new(stream, LinesCodec::new());
    while let Some(item) = framed.next().await {
        let line = match item {
            Ok(line) => line,
            Err(err) => {
                warn!(%peer, error = %err, "shuffle connection framing error, closing");
                return;
            }
        };
        match decode_payload::<T>(&line) {
            Ok(payload) => {
                if tx.send(payload).await.is_err() {
                    return;
                }
            }
            Err(err) => warn!(%peer, error = %err, "dropping malformed shuffle line"),
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
