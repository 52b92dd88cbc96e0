#![warn(missing_docs)]
//! Deterministic test surfaces: golden snapshots, micro-worldtests and a
//! JSONL event stream for headless runs.

mod micro_worldtest;
mod snapshot;

use anyhow::{Context, Result};
use powerworks_core::SimTick;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use micro_worldtest::*;
pub use snapshot::*;

/// One event of a headless run.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord<'a> {
    /// Tick the event happened on.
    pub tick: SimTick,
    /// Short kind label such as `generator_lit`.
    pub kind: &'a str,
    /// Where it happened, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    /// Free-form detail.
    pub detail: String,
}

/// Newline-delimited JSON writer.
pub struct JsonlSink {
    out: BufWriter<File>,
    written: usize,
}

impl JsonlSink {
    /// Create the file at `path`, making parent directories as needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self {
            out: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append one event.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Events written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
