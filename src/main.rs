//! powerworks - headless harness for the powerworks machines
//!
//! Runs a coal generator feeding a battery next to a chain of laser relays
//! for a number of ticks and prints a JSON summary.

mod config;
mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use config::HarnessConfig;
use powerworks_core::SimTick;
use powerworks_testkit::{EventRecord, JsonlSink};
use scenario::Scenario;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the powerworks machines headlessly", long_about = None)]
struct Args {
    /// TOML config file; defaults are used when absent or unreadable
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ticks to simulate (overrides the config file)
    #[arg(long)]
    ticks: Option<u64>,
    /// Write every event as JSON lines to this file
    #[arg(long)]
    events: Option<PathBuf>,
}

fn main() -> Result<()> {
    // WARN by default, RUST_LOG overrides
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    info!("Starting powerworks v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => HarnessConfig::load_from_path(path),
        None => HarnessConfig::default(),
    };
    let ticks = args.ticks.unwrap_or(config.ticks);

    let mut sink = match &args.events {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("failed to open event log {}", path.display()))?,
        ),
        None => None,
    };

    let mut scenario = Scenario::new(&config)?;
    let mut tick = SimTick::ZERO;
    for _ in 0..ticks {
        tick = tick.advance(1);
        for event in scenario.step(tick)? {
            info!(tick = tick.0, kind = event.kind, detail = %event.detail, "event");
            if let Some(sink) = sink.as_mut() {
                sink.write(&EventRecord {
                    tick,
                    kind: event.kind,
                    pos: event.pos.map(|pos| pos.to_string()),
                    detail: event.detail,
                })?;
            }
        }
    }

    if let Some(sink) = sink.as_mut() {
        sink.flush()?;
        info!(events = sink.written(), "event log written");
    }

    let summary = serde_json::to_string_pretty(&scenario.summary())?;
    println!("{summary}");
    Ok(())
}
