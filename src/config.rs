use powerworks_core::ItemId;
use powerworks_machines::{FuelTable, GeneratorConfig, MachinesConfig, RelayConfig};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::warn;

/// Everything the headless harness can be tuned with.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Ticks to run when `--ticks` is not given.
    pub ticks: u64,
    /// Item placed in the generator's fuel slot.
    pub fuel_item: String,
    /// How many of `fuel_item` start in the fuel slot.
    pub fuel_count: u32,
    /// Capacity of the battery next to the generator.
    pub battery_capacity: u32,
    /// Overworld relay positions, linked in list order by the wrench.
    pub relays: Vec<[i32; 3]>,
    /// Burn-time overrides on top of the vanilla table; 0 removes a fuel.
    pub fuels: BTreeMap<String, u32>,
    /// Settings shared by every machine.
    pub machines: MachinesConfig,
    /// Coal generator buffer and production.
    pub generator: GeneratorConfig,
    /// Relay link range.
    pub relay: RelayConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            ticks: 200,
            fuel_item: "coal".to_string(),
            fuel_count: 8,
            battery_capacity: 100_000,
            relays: vec![[0, 70, 0], [8, 70, 0], [8, 70, 8]],
            fuels: BTreeMap::new(),
            machines: MachinesConfig::default(),
            generator: GeneratorConfig::default(),
            relay: RelayConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Load from `path`, falling back to defaults on any error.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<HarnessConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    HarnessConfig::default()
                }
            },
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                HarnessConfig::default()
            }
        }
    }

    /// Vanilla fuels with the configured overrides applied.
    ///
    /// Overrides with an unparsable item id are skipped.
    pub fn fuel_table(&self) -> FuelTable {
        let mut table = FuelTable::default();
        for (id, ticks) in &self.fuels {
            match ItemId::parse(id) {
                Ok(item) => table.insert(item, *ticks),
                Err(err) => warn!("Ignoring fuel override {id:?}: {err}"),
            }
        }
        table
    }
}
