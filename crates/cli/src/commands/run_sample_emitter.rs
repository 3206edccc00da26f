// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `squall run-sample-emitter`: generate traffic for the pluggable input
//! source (spec.md §6 CLI surface). The Kafka-backed producer itself is a
//! collaborator out of core scope (spec.md §1); this emitter's only
//! in-scope backend is the file-backed source `run-processors --file`
//! reads from, so `--use-kafka` is accepted (matching the documented flag
//! surface) but refused with a clear message rather than silently no-op'd.

use crate::exit_error::ExitError;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub struct EmitterArgs {
    pub broker: Option<String>,
    pub topic: Option<String>,
    pub kafka_timeout_ms: Option<u64>,
    pub use_kafka: bool,
    pub file: Option<PathBuf>,
    pub count: u64,
}

pub async fn run(args: EmitterArgs) -> Result<(), ExitError> {
    if args.use_kafka {
        return Err(ExitError::fatal(
            "--use-kafka requires a Kafka-backed input source, which is a collaborator out of this \
             workspace's core scope (spec.md \u{00a7}1); emit to a file with --file instead",
        ));
    }
    let _ = (&args.broker, &args.topic, &args.kafka_timeout_ms);

    let path = args
        .file
        .ok_or_else(|| ExitError::fatal("--file is required when not using --use-kafka"))?;

    let mut file = std::fs::File::create(&path)
        .map_err(|e| ExitError::fatal(format!("failed to create {}: {e}", path.display())))?;
    for n in 1..=args.count {
        writeln!(file, "{n}").map_err(|e| ExitError::fatal(format!("failed to write record {n}: {e}")))?;
    }

    info!(count = args.count, file = %path.display(), "emitted sample records");
    println!("squall: wrote {} record(s) to {}", args.count, path.display());
    Ok(())
}
