//! Tick-stepped snapshot tests for small machine setups.
//!
//! A micro-worldtest owns some state, steps it a fixed number of ticks and
//! records a snapshot before the first step and after every step. The
//! resulting report is checked against a golden JSON file.

use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use powerworks_core::SimTick;
use serde::Serialize;
use std::path::PathBuf;

/// What to run and where its golden lives.
#[derive(Debug, Clone)]
pub struct MicroWorldtestConfig {
    /// Name written into the report.
    pub name: String,
    /// Steps to run. The report holds `ticks + 1` frames.
    pub ticks: u64,
    /// Golden JSON path.
    pub snapshot_path: PathBuf,
}

/// State captured at one tick.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestFrame<S> {
    /// Tick the snapshot was taken after.
    pub tick: u64,
    /// Captured state.
    pub snapshot: S,
}

/// Every frame of one run.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestReport<S> {
    /// Test name.
    pub name: String,
    /// Frames in tick order.
    pub frames: Vec<MicroWorldtestFrame<S>>,
}

/// Step `state` and collect a report without touching any golden.
pub fn record_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    name: impl Into<String>,
    ticks: u64,
    state: &mut State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> MicroWorldtestReport<Snapshot>
where
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let mut tick = SimTick::ZERO;
    let mut frames = Vec::with_capacity(usize::try_from(ticks).unwrap_or(0).saturating_add(1));
    frames.push(MicroWorldtestFrame {
        tick: tick.0,
        snapshot: snapshot(tick, state),
    });

    for _ in 0..ticks {
        step(tick, state);
        tick = tick.advance(1);
        frames.push(MicroWorldtestFrame {
            tick: tick.0,
            snapshot: snapshot(tick, state),
        });
    }

    MicroWorldtestReport {
        name: name.into(),
        frames,
    }
}

/// Run a micro-worldtest and compare its report with the golden.
pub fn run_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    config: MicroWorldtestConfig,
    mut state: State,
    step: StepFn,
    snapshot: SnapFn,
) -> Result<()>
where
    Snapshot: Serialize,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let report = record_micro_worldtest(config.name, config.ticks, &mut state, step, snapshot);
    assert_json_snapshot(config.snapshot_path, &report)
}
