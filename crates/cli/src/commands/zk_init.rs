// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `squall zk-init`: create the coordination store's persistent roots
//! (spec.md §6 CLI surface). Idempotent — a second run against an
//! already-initialized store succeeds without altering `/master_state`'s
//! existing value (spec.md §4.3, §8 "creating the persistent roots is
//! idempotent across repeated zk_init").

use crate::exit_error::ExitError;
use squall_cluster::{MasterStateChannel, LIVING_PROCESSORS_PATH};
use squall_store::{CoordinationStore, StoreError};
use std::sync::Arc;
use tracing::info;

pub async fn run(store: Arc<dyn CoordinationStore>) -> Result<(), ExitError> {
    MasterStateChannel::new(store.clone())
        .ensure_initialized()
        .await
        .map_err(|e| ExitError::fatal(format!("failed to initialize /master_state: {e}")))?;

    match store.create_persistent(LIVING_PROCESSORS_PATH, Vec::new()).await {
        Ok(()) | Err(StoreError::AlreadyExists(_)) => {}
        Err(other) => {
            return Err(ExitError::fatal(format!("failed to create {LIVING_PROCESSORS_PATH}: {other}")));
        }
    }

    info!("coordination store initialized");
    println!("squall: coordination store initialized");
    Ok(())
}
