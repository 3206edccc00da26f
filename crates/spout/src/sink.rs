// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The downstream delivery capability a spout emits through. Kept as a
//! trait so `squall-spout` never depends on `squall-transport` directly —
//! the transport crate provides the real implementation; tests use a
//! channel-backed one.

use async_trait::async_trait;
use squall_core::Payload;

#[async_trait]
pub trait RecordSink<T: Send>: Send + Sync {
    async fn emit(&self, payload: Payload<T>) -> Result<(), String>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use tokio::sync::mpsc;

    /// Forwards every emitted payload onto an unbounded channel for test
    /// assertions.
    pub struct ChannelSink<T> {
        tx: mpsc::UnboundedSender<Payload<T>>,
    }

    impl<T> ChannelSink<T> {
        pub fn new() -> (Self, mpsc::UnboundedReceiver<Payload<T>>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Self { tx }, rx)
        }
    }

    #[async_trait]
    impl<T: Send + 'static> RecordSink<T> for ChannelSink<T> {
        async fn emit(&self, payload: Payload<T>) -> Result<(), String> {
            self.tx.send(payload).map_err(|_| "channel sink receiver dropped".to_string())
        }
    }
}
