// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The generic bolt `run-processors` plugs in for any `bolt`-kind
//! processor named in `squall.toml`. Per spec.md §4.5 the actual tuple
//! formula a bolt computes is a collaborator out of core scope; this is a
//! minimal, real stand-in (count records seen, forward each unchanged) so
//! `run-processors` is runnable end to end against any topology without
//! requiring a concrete business-logic crate to be written first.

use async_trait::async_trait;
use squall_bolt::BoltLogic;

#[derive(Default)]
pub struct PassthroughBolt {
    seen: u64,
}

#[async_trait]
impl BoltLogic for PassthroughBolt {
    type In = String;
    type Out = String;
    type State = u64;

    async fn process(&mut self, input: String) -> Vec<String> {
        self.seen += 1;
        vec![input]
    }

    fn snapshot(&self) -> u64 {
        self.seen
    }

    fn restore(&mut self, state: u64) {
        self.seen = state;
    }
}

/// A [`squall_spout::RecordSink`]/[`squall_bolt`]-compatible sink that
/// discards everything, for a bolt with no configured downstreams (a
/// terminal transform whose output is never shuffled onward).
pub struct NullSink;

#[async_trait]
impl<T: Send> squall_spout::RecordSink<T> for NullSink {
    async fn emit(&self, _payload: squall_core::Payload<T>) -> Result<(), String> {
        Ok(())
    }
}
