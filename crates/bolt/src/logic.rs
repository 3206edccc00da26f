// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transform a bolt applies to each record — everything about *what* a
//! bolt computes is out of core scope (spec.md §4.5 specifies it only as a
//! contract); this is the seam a concrete bolt implementation fills in.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// One bolt's business logic plus its snapshot-able state.
///
/// `State` round-trips through `serde_json` inside [`crate::runtime::BoltRuntime`]
/// — it must capture everything needed to resume processing exactly where
/// the last snapshot left off.
#[async_trait]
pub trait BoltLogic: Send {
    type In: Send + 'static;
    type Out: Send + 'static;
    type State: Serialize + DeserializeOwned + Default + Send;

    /// Apply one input record, producing zero or more output records.
    async fn process(&mut self, input: Self::In) -> Vec<Self::Out>;

    /// Extract the current state for a snapshot.
    fn snapshot(&self) -> Self::State;

    /// Replace the current state with one loaded from a snapshot (or the
    /// fresh-start default, for a bolt with no prior snapshot).
    fn restore(&mut self, state: Self::State);
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;

    /// A bolt that sums every input it sees per key, used by
    /// `squall-bolt`'s own tests and workspace scenario tests (spec.md §8
    /// S1: "one bolt `agg`").
    #[derive(Default)]
    pub struct SummingBolt {
        pub total: i64,
    }

    #[async_trait]
    impl BoltLogic for SummingBolt {
        type In = i64;
        type Out = i64;
        type State = i64;

        async fn process(&mut self, input: i64) -> Vec<i64> {
            self.total += input;
            vec![self.total]
        }

        fn snapshot(&self) -> i64 {
            self.total
        }

        fn restore(&mut self, state: i64) {
            self.total = state;
        }
    }
}

#[cfg(test)]
#[path = "logic_tests.rs"]
mod tests;
