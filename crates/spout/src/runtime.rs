// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The spout runtime loop (spec.md §4.4's gating table), realized as a
//! state machine driven by the master-state mirror.

use crate::error::SpoutError;
use crate::input::InputSource;
use crate::sink::RecordSink;
use squall_cluster::{MasterStateMirror, ProcessorRegistry};
use squall_core::{Clock, MasterState, Offset, Payload, ProcessorId, ProcessorState};
use squall_store::CoordinationStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Paused,
}

/// Tunable timing for the runtime loop.
#[derive(Debug, Clone)]
pub struct SpoutConfig {
    /// How long to sleep between polls while idle — no record available
    /// from the input source, or `MasterState` is `Initialization` /
    /// `Unavailable` (spec.md §4.4's "sleep and re-observe").
    pub idle_throttle: Duration,
}

impl Default for SpoutConfig {
    fn default() -> Self {
        Self { idle_throttle: Duration::from_millis(200) }
    }
}

/// Drives one spout's main loop: reads `MasterState` from a
/// [`MasterStateMirror`], pulls records from an [`InputSource`], forwards
/// them to a [`RecordSink`], and announces its own [`ProcessorState`]
/// through a [`ProcessorRegistry`].
pub struct SpoutRuntime<S, I, E> {
    id: ProcessorId,
    registry: Arc<ProcessorRegistry<S>>,
    mirror: MasterStateMirror,
    input: I,
    sink: E,
    config: SpoutConfig,
    phase: Phase,
}

impl<S, I, E> SpoutRuntime<S, I, E>
where
    S: CoordinationStore,
    I: InputSource,
    E: RecordSink<I::Item>,
{
    pub fn new(
        id: ProcessorId,
        registry: Arc<ProcessorRegistry<S>>,
        mirror: MasterStateMirror,
        input: I,
        sink: E,
        config: SpoutConfig,
    ) -> Self {
        Self { id, registry, mirror, input, sink, config, phase: Phase::Paused }
    }

    /// Register this spout and run its main loop until a fatal error.
    /// Per spec.md §4.4: "a fatal error ... propagates, ephemerals vanish,
    /// and the Negotiator's children-watch observes it" — this never
    /// retries internally, it returns `Err` and the caller lets the
    /// ephemeral registration lapse.
    pub async fn run(mut self) -> Result<(), SpoutError> {
        self.registry
            .register(
                &self.id,
                ProcessorState::spout_paused(self.input.partition().clone(), self.input.current_offset()),
            )
            .await?;

        loop {
            let master = if self.phase == Phase::Paused {
                match self.mirror.changed().await {
                    Some(state) => state,
                    None => return Err(SpoutError::InputSource("master-state watch closed".to_string())),
                }
            } else {
                self.mirror.current()
            };

            match master {
                MasterState::Flowing { next_snapshot: None } => {
                    self.ensure_running().await?;
                    self.step_record(None).await?;
                }
                MasterState::Flowing { next_snapshot: Some(target) } => {
                    self.ensure_running().await?;
                    self.step_record(Some(&target)).await?;
                }
                MasterState::SpoutsPaused => {
                    self.announce_paused_at_current_offset().await?;
                }
                MasterState::SpoutsRewind { clock } => {
                    self.rewind_and_pause(&clock).await?;
                }
                MasterState::Initialization | MasterState::Unavailable => {
                    tokio::time::sleep(self.config.idle_throttle).await;
                }
            }
        }
    }

    async fn ensure_running(&mut self) -> Result<(), SpoutError> {
        if self.phase == Phase::Paused {
            self.registry.set_processor_state(&self.id, ProcessorState::SpoutRunning).await?;
            self.phase = Phase::Running;
            debug!(processor = %self.id, "spout resumed");
        }
        Ok(())
    }

    async fn announce_paused_at_current_offset(&mut self) -> Result<(), SpoutError> {
        let offset = self.input.current_offset();
        self.registry
            .set_processor_state(&self.id, ProcessorState::spout_paused(self.input.partition().clone(), offset))
            .await?;
        self.phase = Phase::Paused;
        Ok(())
    }

    async fn rewind_and_pause(&mut self, target: &Clock) -> Result<(), SpoutError> {
        let offset = target.get(self.input.partition()).unwrap_or(Offset::ZERO);
        self.input.seek(offset);
        self.registry
            .set_processor_state(&self.id, ProcessorState::spout_paused(self.input.partition().clone(), offset))
            .await?;
        self.phase = Phase::Paused;
        info!(processor = %self.id, %offset, "spout rewound for replay");
        Ok(())
    }

    /// Read and forward one record. If `snapshot_target` is set, the spout
    /// must not read past it: spec.md §4.4 row 2 says "when the spout's own
    /// partition offset *reaches* `c[partition]`, transition to paused" —
    /// by the time `Flowing(Just c)` is observed, this spout's offset
    /// already equals `c[partition]` (the cut Clock is built directly from
    /// the `SpoutPaused` announcement this spout made to enter the cut), so
    /// the boundary must be checked against `current_offset()` *before* any
    /// read, not after reading one record past it.
    async fn step_record(&mut self, snapshot_target: Option<&Clock>) -> Result<(), SpoutError> {
        if let Some(target) = snapshot_target {
            let boundary = target.get(self.input.partition()).unwrap_or(Offset::ZERO);
            if self.input.current_offset() >= boundary {
                self.registry
                    .set_processor_state(
                        &self.id,
                        ProcessorState::spout_paused(self.input.partition().clone(), boundary),
                    )
                    .await?;
                self.phase = Phase::Paused;
                return Ok(());
            }
        }

        let Some((item, offset)) =
            self.input.next().await.map_err(SpoutError::InputSource)?
        else {
            tokio::time::sleep(self.config.idle_throttle).await;
            return Ok(());
        };

        let mut clock = Clock::empty();
        clock.insert(self.input.partition().clone(), offset);
        self.sink.emit(Payload::new(item, clock)).await.map_err(SpoutError::Sink)?;

        if let Some(target) = snapshot_target {
            let boundary = target.get(self.input.partition()).unwrap_or(Offset::ZERO);
            if offset >= boundary {
                self.registry
                    .set_processor_state(
                        &self.id,
                        ProcessorState::spout_paused(self.input.partition().clone(), offset),
                    )
                    .await?;
                self.phase = Phase::Paused;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
