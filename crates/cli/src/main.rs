// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `squall`: the cluster coordination runtime's CLI (spec.md §6).

mod bolt_logic;
mod commands;
mod config;
mod exit_error;
mod input_source;

use clap::{Parser, Subcommand, ValueEnum};
use commands::run_processors::StoreHandle;
use config::FileConfig;
use exit_error::ExitError;
use squall_store::{ConnectOptions, EtcdStore, MemoryStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "squall", version, about = "The squall cluster coordination runtime")]
struct Cli {
    /// Path to the squall.toml topology/config file.
    #[arg(long, global = true, default_value = "squall.toml")]
    config: PathBuf,

    /// Which coordination-store backend to connect to.
    #[arg(long, global = true, value_enum, default_value_t = StoreKind::Memory)]
    store: StoreKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreKind {
    Memory,
    Etcd,
}

#[derive(Subcommand)]
enum Command {
    /// Create the coordination store's persistent roots.
    ZkInit,
    /// Dump the current MasterState and every live processor's state.
    ZkShow,
    /// Run an entirely in-process demo of one spout/bolt/sink pipeline.
    RunSample,
    /// Start one or more real, networked processors declared in the config.
    RunProcessors {
        /// Processor ids to start, e.g. `src-0 agg-0 out-0` or `negotiator`.
        ids: Vec<String>,
        /// File the named spout(s) read lines from.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Generate sample input for `run-processors --file`.
    RunSampleEmitter {
        /// Kafka broker address (rejected: see --use-kafka).
        #[arg(long)]
        broker: Option<String>,
        /// Kafka topic (rejected: see --use-kafka).
        #[arg(long)]
        topic: Option<String>,
        /// Kafka produce timeout in milliseconds (rejected: see --use-kafka).
        #[arg(long)]
        kafka_timeout_ms: Option<u64>,
        /// Emit through a Kafka producer instead of a file (unsupported).
        #[arg(long)]
        use_kafka: bool,
        /// Output file for the emitted records.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Number of records to emit.
        #[arg(long, default_value_t = 100)]
        count: u64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(err) = dispatch(cli).await {
        eprintln!("squall: {err}");
        std::process::exit(err.code);
    }
}

async fn dispatch(cli: Cli) -> Result<(), ExitError> {
    match cli.command {
        Command::ZkInit => {
            let store = build_store_handle(cli.store, &cli.config).await?;
            commands::zk_init::run(store.as_dyn()).await
        }
        Command::ZkShow => {
            let store = build_store_handle(cli.store, &cli.config).await?;
            commands::zk_show::run(store.as_dyn()).await
        }
        Command::RunSample => commands::run_sample::run().await,
        Command::RunProcessors { ids, file } => {
            let store = build_store_handle(cli.store, &cli.config).await?;
            let config = FileConfig::load(&cli.config)?;
            commands::run_processors::run(commands::run_processors::RunProcessorsArgs {
                config,
                ids,
                store,
                input_file: file,
            })
            .await
        }
        Command::RunSampleEmitter { broker, topic, kafka_timeout_ms, use_kafka, file, count } => {
            commands::run_sample_emitter::run(commands::run_sample_emitter::EmitterArgs {
                broker,
                topic,
                kafka_timeout_ms,
                use_kafka,
                file,
                count,
            })
            .await
        }
    }
}

async fn build_store_handle(kind: StoreKind, config_path: &PathBuf) -> Result<StoreHandle, ExitError> {
    match kind {
        StoreKind::Memory => Ok(StoreHandle::Memory(Arc::new(MemoryStore::new()))),
        StoreKind::Etcd => {
            let options = if config_path.exists() {
                FileConfig::load(config_path)?.store.connect_options()
            } else {
                ConnectOptions::default()
            };
            let store = EtcdStore::connect(&options)
                .await
                .map_err(|e| ExitError::fatal(format!("failed to connect to etcd: {e}")))?;
            Ok(StoreHandle::Etcd(Arc::new(store)))
        }
    }
}
