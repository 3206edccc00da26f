// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The unit of data flowing between operators.

use crate::clock::Clock;
use serde::{Deserialize, Serialize};

/// An opaque user tuple paired with the Clock of the input record(s) it
/// derives from.
///
/// `T` is left generic rather than fixed to bytes: the tuple formula layer
/// (out of core scope) owns the concrete shape of user data, while the core
/// only needs to carry the Clock alongside it through every operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload<T> {
    pub tuple: T,
    pub clock: Clock,
}

impl<T> Payload<T> {
    pub fn new(tuple: T, clock: Clock) -> Self {
        Self { tuple, clock }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Payload<U> {
        Payload { tuple: f(self.tuple), clock: self.clock }
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
