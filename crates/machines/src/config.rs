//! Tunables handed to machines at construction.
//!
//! These replace process-wide switches: every block entity receives the values
//! it needs when it is built, so two worlds can run with different settings.

use serde::{Deserialize, Serialize};

/// Settings shared by every block entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachinesConfig {
    /// Throttle for observer syncs of steadily changing values, in ticks.
    pub sync_interval_ticks: u32,
    /// Whether energy providers push into neighbouring storages each tick.
    pub share_energy: bool,
}

impl Default for MachinesConfig {
    fn default() -> Self {
        Self {
            sync_interval_ticks: 5,
            share_energy: true,
        }
    }
}

/// Coal generator buffer and production rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Energy buffer size.
    pub capacity: u32,
    /// Largest amount accepted from outside per call (0: produce-only).
    pub max_receive: u32,
    /// Largest amount handed out per call.
    pub max_extract: u32,
    /// Energy added per burning tick.
    pub production_per_tick: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            capacity: 60_000,
            max_receive: 0,
            max_extract: 80,
            production_per_tick: 30,
        }
    }
}

/// Laser relay connection rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Longest allowed connection, in blocks.
    pub max_distance: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { max_distance: 15 }
    }
}
