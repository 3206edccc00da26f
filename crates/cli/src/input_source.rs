// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A concrete, file-backed [`squall_spout::InputSource`] — the `--file`
//! flag's backend (spec.md §6). The pluggable input source's business logic
//! (partition/offset algebra for a *real* file or Kafka topic) is out of
//! core scope; this is the minimal real implementation `run-processors`
//! needs to be runnable end to end without a broker.
//!
//! Offsets are `1..=line count`, one partition per file, matching
//! `squall_spout::input::test_support::VecInputSource`'s convention so the
//! two sources agree on what "offset" means for identical content.

use async_trait::async_trait;
use squall_core::{Offset, PartitionId};
use squall_spout::InputSource;
use std::collections::VecDeque;
use std::path::Path;

pub struct FileLineInputSource {
    partition: PartitionId,
    lines: VecDeque<(String, Offset)>,
    cursor: Offset,
}

impl FileLineInputSource {
    pub fn open(partition: impl Into<PartitionId>, path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (line.to_string(), Offset::new(i as u64 + 1)))
            .collect();
        Ok(Self { partition: partition.into(), lines, cursor: Offset::ZERO })
    }
}

#[async_trait]
impl InputSource for FileLineInputSource {
    type Item = String;

    fn partition(&self) -> &PartitionId {
        &self.partition
    }

    fn current_offset(&self) -> Offset {
        self.cursor
    }

    async fn next(&mut self) -> Result<Option<(Self::Item, Offset)>, String> {
        let Some((line, offset)) = self.lines.pop_front() else { return Ok(None) };
        self.cursor = offset;
        Ok(Some((line, offset)))
    }

    fn seek(&mut self, offset: Offset) {
        self.cursor = offset;
        self.lines.retain(|(_, line_offset)| *line_offset > offset);
    }
}
