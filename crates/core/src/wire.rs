// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit wire schema for coordination-store values.
//!
//! The store only moves bytes; `MasterState` and `ProcessorState` need a
//! stable on-the-wire representation so that a future variant can be added
//! without breaking old readers mid-rollout. Each encoded value is
//! `[tag: u8][len: u32 LE][body]`, where `body` is the variant's data
//! encoded as JSON (compact, but not used for the tag itself, which a
//! reader must be able to dispatch on without parsing JSON first).
//!
//! This is the single source of truth for encoding: `serde::Serialize`/
//! `Deserialize` on `MasterState`/`ProcessorState` (used for e.g. `zk-show`
//! JSON dumps) are a separate, human-readable representation and are not
//! required to produce identical bytes to this module — only to decode back
//! to an equal value, which the round-trip tests below and in
//! `processor_tests`/`master_state_tests` both check.

use crate::clock::Clock;
use crate::master_state::MasterState;
use crate::partition::{Offset, PartitionId};
use crate::processor::ProcessorState;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireDecodeError {
    #[error("wire value truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("unknown wire tag {0}")]
    UnknownTag(u8),
    #[error("malformed wire body: {0}")]
    MalformedBody(String),
}

/// The tag byte identifying a `MasterState` or `ProcessorState` variant.
/// `MasterState` and `ProcessorState` use disjoint tag ranges so a stray
/// decode against the wrong type fails fast on `UnknownTag` rather than
/// silently misinterpreting the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireTag {
    Unavailable = 0,
    Initialization = 1,
    SpoutsRewind = 2,
    SpoutsPaused = 3,
    Flowing = 4,
    UnspecifiedState = 10,
    SpoutRunning = 11,
    SpoutPaused = 12,
    BoltRunning = 13,
    BoltLoaded = 14,
    BoltSaved = 15,
    SinkRunning = 16,
    NegotiatorRunning = 17,
}

fn frame(tag: WireTag, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + 4 + body.len());
    out.push(tag as u8);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

fn unframe(bytes: &[u8]) -> Result<(u8, &[u8]), WireDecodeError> {
    if bytes.len() < 5 {
        return Err(WireDecodeError::Truncated { expected: 5, actual: bytes.len() });
    }
    let tag = bytes[0];
    let len = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
    let body = &bytes[5..];
    if body.len() != len {
        return Err(WireDecodeError::Truncated { expected: 5 + len, actual: bytes.len() });
    }
    Ok((tag, body))
}

fn encode_json<T: serde::Serialize>(value: &T) -> Vec<u8> {
    // Infallible: every type this is called with is a plain data struct with
    // no maps keyed by non-string types that could fail to serialize.
    serde_json::to_vec(value).unwrap_or_default()
}

fn decode_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, WireDecodeError> {
    serde_json::from_slice(body).map_err(|e| WireDecodeError::MalformedBody(e.to_string()))
}

pub fn encode_master_state(state: &MasterState) -> Vec<u8> {
    match state {
        MasterState::Unavailable => frame(WireTag::Unavailable, &[]),
        MasterState::Initialization => frame(WireTag::Initialization, &[]),
        MasterState::SpoutsRewind { clock } => {
            frame(WireTag::SpoutsRewind, &encode_json(clock))
        }
        MasterState::SpoutsPaused => frame(WireTag::SpoutsPaused, &[]),
        MasterState::Flowing { next_snapshot } => {
            frame(WireTag::Flowing, &encode_json(next_snapshot))
        }
    }
}

pub fn decode_master_state(bytes: &[u8]) -> Result<MasterState, WireDecodeError> {
    let (tag, body) = unframe(bytes)?;
    match tag {
        t if t == WireTag::Unavailable as u8 => Ok(MasterState::Unavailable),
        t if t == WireTag::Initialization as u8 => Ok(MasterState::Initialization),
        t if t == WireTag::SpoutsRewind as u8 => {
            Ok(MasterState::SpoutsRewind { clock: decode_json::<Clock>(body)? })
        }
        t if t == WireTag::SpoutsPaused as u8 => Ok(MasterState::SpoutsPaused),
        t if t == WireTag::Flowing as u8 => Ok(MasterState::Flowing {
            next_snapshot: decode_json::<Option<Clock>>(body)?,
        }),
        other => Err(WireDecodeError::UnknownTag(other)),
    }
}

pub fn encode_processor_state(state: &ProcessorState) -> Vec<u8> {
    match state {
        ProcessorState::UnspecifiedState => frame(WireTag::UnspecifiedState, &[]),
        ProcessorState::SpoutRunning => frame(WireTag::SpoutRunning, &[]),
        ProcessorState::SpoutPaused { partition, offset } => {
            frame(WireTag::SpoutPaused, &encode_json(&(partition, offset)))
        }
        ProcessorState::BoltRunning => frame(WireTag::BoltRunning, &[]),
        ProcessorState::BoltLoaded { clock } => frame(WireTag::BoltLoaded, &encode_json(clock)),
        ProcessorState::BoltSaved { clock } => frame(WireTag::BoltSaved, &encode_json(clock)),
        ProcessorState::SinkRunning => frame(WireTag::SinkRunning, &[]),
        ProcessorState::NegotiatorRunning => frame(WireTag::NegotiatorRunning, &[]),
    }
}

pub fn decode_processor_state(bytes: &[u8]) -> Result<ProcessorState, WireDecodeError> {
    let (tag, body) = unframe(bytes)?;
    match tag {
        t if t == WireTag::UnspecifiedState as u8 => Ok(ProcessorState::UnspecifiedState),
        t if t == WireTag::SpoutRunning as u8 => Ok(ProcessorState::SpoutRunning),
        t if t == WireTag::SpoutPaused as u8 => {
            let (partition, offset) = decode_json::<(PartitionId, Offset)>(body)?;
            Ok(ProcessorState::SpoutPaused { partition, offset })
        }
        t if t == WireTag::BoltRunning as u8 => Ok(ProcessorState::BoltRunning),
        t if t == WireTag::BoltLoaded as u8 => {
            Ok(ProcessorState::BoltLoaded { clock: decode_json::<Clock>(body)? })
        }
        t if t == WireTag::BoltSaved as u8 => {
            Ok(ProcessorState::BoltSaved { clock: decode_json::<Clock>(body)? })
        }
        t if t == WireTag::SinkRunning as u8 => Ok(ProcessorState::SinkRunning),
        t if t == WireTag::NegotiatorRunning as u8 => Ok(ProcessorState::NegotiatorRunning),
        other => Err(WireDecodeError::UnknownTag(other)),
    }
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
