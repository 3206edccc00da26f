// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! squall-store: a thin capability wrapper over a hierarchical coordination
//! service (ephemeral nodes, watches, CAS-style create/set, children
//! listing). The rest of the workspace is written against [`CoordinationStore`]
//! and never imports [`EtcdStore`]/[`MemoryStore`] directly.

pub mod error;
pub mod etcd;
pub mod memory;
pub mod store;
pub mod watch;

pub use error::StoreError;
pub use etcd::EtcdStore;
pub use memory::MemoryStore;
pub use store::{ConnectOptions, CoordinationStore};
pub use watch::{ChildrenWatch, DataWatch};
