// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `squall` command implementations (spec.md §6 CLI surface).

pub mod run_processors;
pub mod run_sample;
pub mod run_sample_emitter;
pub mod zk_init;
pub mod zk_show;

use async_trait::async_trait;
use squall_core::Payload;
use squall_spout::RecordSink;
use tokio::sync::mpsc;

/// A [`RecordSink`] over a plain bounded `mpsc::Sender`, used to wire a
/// spout's output directly into a bolt's input (or a bolt's output into a
/// terminal print loop) within a single process — `run-sample`'s in-process
/// topology and `run-processors`' same-process bolt/sink pairing both need
/// this; it is the one piece of plumbing neither `squall-spout` nor
/// `squall-bolt` owns since each only depends on the `RecordSink` trait, not
/// on any particular channel.
pub struct BoundedChannelSink<T> {
    tx: mpsc::Sender<Payload<T>>,
}

impl<T> BoundedChannelSink<T> {
    pub fn new(tx: mpsc::Sender<Payload<T>>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl<T: Send + 'static> RecordSink<T> for BoundedChannelSink<T> {
    async fn emit(&self, payload: Payload<T>) -> Result<(), String> {
        self.tx.send(payload).await.map_err(|_| "downstream receiver dropped".to_string())
    }
}
