// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! squall-negotiator: the Negotiator (C6), the single driver of the master
//! state machine (spec.md §4.6) — membership supervisor, snapshot-driver
//! sequence, and the periodic snapshot-cut flow loop.

pub mod driver;
pub mod error;
pub mod negotiator;

pub use driver::SnapshotDriver;
pub use error::NegotiatorError;
pub use negotiator::{Negotiator, NegotiatorConfig};
