#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use std::io::{BufWriter, stdout};

use clap::Parser;
use config::{CliArgs, Command, Config};
use telemetry::init_telemetry;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry(config.log_format)?;
    tracing::debug!(?config, "starting");

    let mut out = BufWriter::new(stdout().lock());
    match &config.command {
        Command::Generate { count, generator } => {
            commands::generate(&mut out, *generator, config.machine_id, config.epoch, *count)
        }
        Command::Decode { ids } => commands::decode(&mut out, ids, config.epoch),
    }
}
