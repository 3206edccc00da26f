// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shuffle wire line, spec.md §6: `<serialized-tuple>\x01<serialized-clock>\n`.
//!
//! Framing onto the socket (the trailing `\n`) is delegated to
//! [`tokio_util::codec::LinesCodec`]; this module only owns the split on the
//! `\x01` separator and the JSON body of each half.

use crate::error::TransportError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use squall_core::Payload;

const SEPARATOR: char = '\u{1}';

pub fn encode_payload<T: Serialize>(payload: &Payload<T>) -> Result<String, TransportError> {
    let tuple = serde_json::to_string(&payload.tuple)?;
    let clock = serde_json::to_string(&payload.clock)?;
    Ok(format!("{tuple}{SEPARATOR}{clock}"))
}

pub fn decode_payload<T: DeserializeOwned>(line: &str) -> Result<Payload<T>, TransportError> {
    let mut parts = line.splitn(2, SEPARATOR);
    let tuple_json = parts.next().ok_or_else(|| TransportError::Framing(line.to_string()))?;
    let clock_json = parts
        .next()
        .ok_or_else(|| TransportError::Framing(format!("missing separator in {line:?}")))?;
    let tuple = serde_json::from_str(tuple_json)?;
    let clock = serde_json::from_str(clock_json)?;
    Ok(Payload::new(tuple, clock))
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
