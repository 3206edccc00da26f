// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `squall zk-show`: dump the coordination store's current `MasterState`
//! and every live processor's `ProcessorState` as human-readable JSON
//! (spec.md §6 CLI surface).

use crate::exit_error::ExitError;
use serde::Serialize;
use squall_cluster::{LIVING_PROCESSORS_PATH, MASTER_STATE_PATH};
use squall_core::wire::{decode_master_state, decode_processor_state};
use squall_core::{MasterState, ProcessorId, ProcessorState};
use squall_store::CoordinationStore;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct ClusterDump {
    master_state: Option<MasterState>,
    processors: Vec<ProcessorDump>,
}

#[derive(Debug, Serialize)]
struct ProcessorDump {
    id: String,
    state: Option<ProcessorState>,
    error: Option<String>,
}

pub async fn run(store: Arc<dyn CoordinationStore>) -> Result<(), ExitError> {
    let master_state = match store.get(MASTER_STATE_PATH).await {
        Ok(Some(bytes)) => Some(
            decode_master_state(&bytes)
                .map_err(|e| ExitError::fatal(format!("malformed {MASTER_STATE_PATH}: {e}")))?,
        ),
        Ok(None) => None,
        Err(e) => return Err(ExitError::fatal(format!("failed to read {MASTER_STATE_PATH}: {e}"))),
    };

    let children = store
        .children(LIVING_PROCESSORS_PATH)
        .await
        .map_err(|e| ExitError::fatal(format!("failed to list {LIVING_PROCESSORS_PATH}: {e}")))?;

    let mut processors = Vec::with_capacity(children.len());
    for leaf in children {
        let path = format!("{LIVING_PROCESSORS_PATH}/{leaf}");
        let (state, error) = match store.get(&path).await {
            Ok(Some(bytes)) => match decode_processor_state(&bytes) {
                Ok(state) => (Some(state), None),
                Err(e) => (None, Some(e.to_string())),
            },
            Ok(None) => (None, Some("listed as a child but value vanished before read".to_string())),
            Err(e) => (None, Some(e.to_string())),
        };
        let id = ProcessorId::parse_registration_key(&leaf)
            .map(|id| id.to_string())
            .unwrap_or(leaf);
        processors.push(ProcessorDump { id, state, error });
    }
    processors.sort_by(|a, b| a.id.cmp(&b.id));

    let dump = ClusterDump { master_state, processors };
    let json = serde_json::to_string_pretty(&dump)
        .map_err(|e| ExitError::fatal(format!("failed to render cluster dump: {e}")))?;
    println!("{json}");
    Ok(())
}
