//! Headless scenario: a coal generator charging a battery while a player
//! links a chain of laser relays with the wrench.

use crate::config::HarnessConfig;
use anyhow::{Context, Result};
use powerworks_core::{tag, DimensionId, Facing, ItemId, ItemStack, SimTick, WorldPos};
use powerworks_machines::coal_generator::FUEL_SLOT;
use powerworks_machines::{
    AdjacentStorages, BlockEntity, BurnState, CoalGenerator, EnergyBuffer, EnergyStorage,
    LaserWrench, LinkOutcome, RelayNetwork, SyncMode,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

/// Something worth reporting that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessEvent {
    pub kind: &'static str,
    pub pos: Option<WorldPos>,
    pub detail: String,
}

impl HarnessEvent {
    fn at(kind: &'static str, pos: WorldPos, detail: impl Into<String>) -> Self {
        Self {
            kind,
            pos: Some(pos),
            detail: detail.into(),
        }
    }
}

/// End-of-run numbers printed by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub ticks: u64,
    pub generator_energy: u32,
    pub battery_energy: u32,
    pub fuel_left: u32,
    pub saves: u32,
    pub syncs: u32,
    pub connections: usize,
    pub largest_network: usize,
}

pub struct Scenario {
    generator: CoalGenerator,
    storages: BTreeMap<WorldPos, EnergyBuffer>,
    battery: WorldPos,
    relays: BTreeSet<WorldPos>,
    network: RelayNetwork,
    wrench: ItemStack,
    clicks: VecDeque<WorldPos>,
    last_state: BurnState,
    saves: u32,
    syncs: u32,
    ticks: u64,
}

impl Scenario {
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let fuel_id = ItemId::parse(&config.fuel_item)
            .with_context(|| format!("invalid fuel item {:?}", config.fuel_item))?;

        let origin = WorldPos::new(DimensionId::OVERWORLD, 0, 64, 0);
        let mut generator = CoalGenerator::new(
            origin,
            Arc::new(config.fuel_table()),
            &config.machines,
            &config.generator,
        );
        let fuel = ItemStack::new(fuel_id, config.fuel_count);
        let rest = generator
            .base_mut()
            .inventory_mut()
            .insert(FUEL_SLOT, fuel, false, false);
        if !rest.is_empty() {
            info!(left_over = rest.count, item = %rest.item, "fuel slot could not take everything");
        }
        generator.take_dirty();

        let battery = origin.offset(Facing::East);
        let mut storages = BTreeMap::new();
        storages.insert(
            battery,
            EnergyBuffer::new(config.battery_capacity, config.battery_capacity, 0),
        );

        let relays: Vec<WorldPos> = config
            .relays
            .iter()
            .map(|[x, y, z]| WorldPos::new(DimensionId::OVERWORLD, *x, *y, *z))
            .collect();
        let clicks = relays
            .windows(2)
            .flat_map(|pair| [pair[0], pair[1]])
            .collect();

        Ok(Self {
            generator,
            storages,
            battery,
            relays: relays.into_iter().collect(),
            network: RelayNetwork::new(&config.relay),
            wrench: LaserWrench::new_stack(),
            clicks,
            last_state: BurnState::Idle,
            saves: 0,
            syncs: 0,
            ticks: 0,
        })
    }

    /// Run one tick of every participant.
    pub fn step(&mut self, tick: SimTick) -> Result<Vec<HarnessEvent>> {
        let mut events = Vec::new();
        self.ticks += 1;

        let pos = self.generator.pos();
        self.generator.update(&mut AdjacentStorages::new(pos, &mut self.storages));

        let state = self.generator.state();
        if state != self.last_state {
            let kind = match state {
                BurnState::Burning => "generator_lit",
                BurnState::Idle => "generator_idle",
            };
            events.push(HarnessEvent::at(
                kind,
                pos,
                format!("fuel left {}", self.generator.fuel().count),
            ));
            self.last_state = state;
        }

        if self.generator.take_dirty() {
            let saved = self.generator.write_tag(SyncMode::PersistToStorage);
            let bytes = tag::encode(&saved).context("encoding generator save")?;
            self.saves += 1;
            events.push(HarnessEvent::at("generator_saved", pos, format!("{} bytes", bytes.len())));
        }
        if self.generator.take_sync_request() {
            self.syncs += 1;
            let energy = self.generator.storage().energy_stored();
            debug!(tick = tick.0, energy, "generator synced");
        }

        if let Some(target) = self.clicks.pop_front() {
            let mut messages: Vec<LinkOutcome> = Vec::new();
            LaserWrench::use_on_block(
                &mut self.wrench,
                &mut messages,
                &self.relays,
                &mut self.network,
                target,
            );
            for outcome in messages {
                events.push(HarnessEvent::at("wrench", target, outcome.message()));
            }
        }
        LaserWrench::inventory_tick(&mut self.wrench, &self.relays);

        Ok(events)
    }

    pub fn summary(&self) -> Summary {
        let largest_network = self
            .relays
            .iter()
            .map(|pos| self.network.network_of(pos).len())
            .max()
            .unwrap_or(0);
        Summary {
            ticks: self.ticks,
            generator_energy: self.generator.storage().energy_stored(),
            battery_energy: self
                .storages
                .get(&self.battery)
                .map_or(0, |battery| battery.energy_stored()),
            fuel_left: self.generator.fuel().count,
            saves: self.saves,
            syncs: self.syncs,
            connections: self.network.len(),
            largest_network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(config: &HarnessConfig, ticks: u64) -> (Scenario, Vec<HarnessEvent>) {
        let mut scenario = Scenario::new(config).expect("scenario builds");
        let mut events = Vec::new();
        let mut tick = SimTick::ZERO;
        for _ in 0..ticks {
            events.extend(scenario.step(tick).expect("step"));
            tick = tick.advance(1);
        }
        (scenario, events)
    }

    #[test]
    fn default_run_links_relays_and_charges_battery() {
        let (scenario, events) = run(&HarnessConfig::default(), 20);
        let summary = scenario.summary();

        assert_eq!(summary.connections, 2);
        assert_eq!(summary.largest_network, 3);
        assert_eq!(summary.fuel_left, 7);
        assert!(summary.battery_energy > 0);
        assert_eq!(summary.syncs, 4);
        assert_eq!(events.first().map(|e| e.kind), Some("generator_lit"));

        let wrench: Vec<_> = events
            .iter()
            .filter(|e| e.kind == "wrench")
            .map(|e| e.detail.as_str())
            .collect();
        assert_eq!(wrench, ["Stored!", "Connected!", "Stored!", "Connected!"]);
    }

    #[test]
    fn non_fuel_item_never_lights() {
        let config = HarnessConfig {
            fuel_item: "cobblestone".into(),
            relays: Vec::new(),
            ..HarnessConfig::default()
        };
        let (scenario, events) = run(&config, 10);
        assert!(events.is_empty());
        assert_eq!(scenario.summary().fuel_left, 0);
    }

    #[test]
    fn invalid_fuel_id_is_an_error() {
        let config = HarnessConfig {
            fuel_item: "Not An Id".into(),
            ..HarnessConfig::default()
        };
        assert!(Scenario::new(&config).is_err());
    }
}
