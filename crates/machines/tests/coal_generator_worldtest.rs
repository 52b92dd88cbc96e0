use powerworks_core::{DimensionId, Facing, ItemId, ItemStack, WorldPos};
use powerworks_machines::coal_generator::FUEL_SLOT;
use powerworks_machines::{
    BlockEntity, BurnState, CoalGenerator, EnergyBuffer, EnergyStorage, FuelTable,
    GeneratorConfig, MachinesConfig, NoNeighbors, SyncMode,
};
use powerworks_testkit::{run_micro_worldtest, MicroWorldtestConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

fn snapshot_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/snapshots")
        .join(name)
}

fn coal(count: u32) -> ItemStack {
    ItemStack::new(ItemId::parse("coal").expect("valid id"), count)
}

fn generator_with(machines: &MachinesConfig) -> CoalGenerator {
    CoalGenerator::new(
        WorldPos::new(DimensionId::OVERWORLD, 10, 64, 10),
        Arc::new(FuelTable::default()),
        machines,
        &GeneratorConfig::default(),
    )
}

fn generator() -> CoalGenerator {
    generator_with(&MachinesConfig::default())
}

#[test]
fn first_step_lights_and_burns() {
    let mut machine = generator();
    machine.base_mut().inventory_mut().set(FUEL_SLOT, coal(1));

    machine.update(&mut NoNeighbors);

    assert_eq!(machine.state(), BurnState::Burning);
    assert_eq!(machine.current_burn_time(), 1599);
    assert_eq!(machine.storage().energy_stored(), 30);
    assert!(machine.fuel().is_empty());
    assert!(machine.take_dirty());
}

#[test]
fn redstone_keeps_generator_idle() {
    let mut machine = generator();
    machine.base_mut().inventory_mut().set(FUEL_SLOT, coal(3));
    machine.set_redstone_powered(true);
    machine.take_dirty();

    for _ in 0..200 {
        machine.update(&mut NoNeighbors);
    }

    assert_eq!(machine.state(), BurnState::Idle);
    assert_eq!(machine.fuel().count, 3);
    assert_eq!(machine.storage().energy_stored(), 0);
    assert!(!machine.take_dirty());
}

#[test]
fn redstone_does_not_stop_a_burning_unit() {
    let mut machine = generator();
    machine.base_mut().inventory_mut().set(FUEL_SLOT, coal(2));
    machine.update(&mut NoNeighbors);
    machine.set_redstone_powered(true);

    machine.update(&mut NoNeighbors);
    assert_eq!(machine.current_burn_time(), 1598);
    assert_eq!(machine.fuel().count, 1);
}

#[test]
fn half_full_buffer_gives_comparator_seven() {
    let mut machine = generator();
    machine.storage_mut().set_energy(30_000);
    assert_eq!(machine.comparator_signal(), 7);

    machine.storage_mut().set_energy(60_000);
    assert_eq!(machine.comparator_signal(), 15);
}

#[test]
fn burn_out_relights_from_next_unit() {
    let mut machine = generator();
    let stick = ItemStack::new(ItemId::parse("stick").expect("valid id"), 2);
    machine.base_mut().inventory_mut().set(FUEL_SLOT, stick);

    for _ in 0..100 {
        machine.update(&mut NoNeighbors);
    }
    assert_eq!(machine.current_burn_time(), 0);
    assert_eq!(machine.fuel().count, 1);
    assert_eq!(machine.storage().energy_stored(), 3000);

    machine.update(&mut NoNeighbors);
    assert_eq!(machine.current_burn_time(), 99);
    assert!(machine.fuel().is_empty());
}

#[test]
fn comparator_step_marks_dirty_while_burning() {
    let mut machine = generator();
    machine.base_mut().inventory_mut().set(FUEL_SLOT, coal(1));
    machine.update(&mut NoNeighbors);
    assert!(machine.take_dirty());

    // 30 per tick: 3970 reads 0, 4000 is the first 1.
    machine.storage_mut().set_energy(3_940);
    let mut dirty = Vec::new();
    for _ in 0..4 {
        machine.update(&mut NoNeighbors);
        dirty.push((machine.comparator_signal(), machine.take_dirty()));
    }
    assert_eq!(dirty, [(0, false), (1, true), (1, false), (1, false)]);
    assert_eq!(machine.state(), BurnState::Burning);
}

#[test]
fn burn_out_marks_dirty_once() {
    let mut machine = generator();
    let stick = ItemStack::new(ItemId::parse("stick").expect("valid id"), 1);
    machine.base_mut().inventory_mut().set(FUEL_SLOT, stick);
    machine.take_dirty();

    let mut dirty_ticks = Vec::new();
    for tick in 1..=105u32 {
        machine.update(&mut NoNeighbors);
        if machine.take_dirty() {
            dirty_ticks.push(tick);
        }
    }
    assert_eq!(dirty_ticks, [1, 100]);
    assert_eq!(machine.state(), BurnState::Idle);
}

#[test]
fn storage_load_packet_restores_energy_only() {
    let mut source = generator();
    source.base_mut().inventory_mut().set(FUEL_SLOT, coal(2));
    source.update(&mut NoNeighbors);
    source.update(&mut NoNeighbors);
    let tag = source.write_tag(SyncMode::SyncOnStorageLoad);

    let mut client = generator();
    let stick = ItemStack::new(ItemId::parse("stick").expect("valid id"), 1);
    client.base_mut().inventory_mut().set(FUEL_SLOT, stick);
    client.update(&mut NoNeighbors);
    client.take_dirty();

    client.read_tag(&tag, SyncMode::SyncOnStorageLoad);
    assert_eq!(client.current_burn_time(), 99);
    assert_eq!(client.max_burn_time(), 100);
    assert_eq!(client.storage().energy_stored(), 60);
    assert!(client.fuel().is_empty());
    assert!(!client.take_dirty());
}

#[test]
fn steady_changes_sync_only_on_interval() {
    let mut machine = generator();
    machine.base_mut().inventory_mut().set(FUEL_SLOT, coal(1));

    let mut synced_ticks = Vec::new();
    for tick in 1..=12u32 {
        machine.update(&mut NoNeighbors);
        if machine.take_sync_request() {
            synced_ticks.push(tick);
        }
    }
    assert_eq!(synced_ticks, [5, 10]);
}

#[test]
fn energy_is_pushed_to_neighbours() {
    let mut machine = generator();
    machine.storage_mut().set_energy(600);

    let mut neighbors = BTreeMap::new();
    neighbors.insert(Facing::Down, EnergyBuffer::new(10_000, 1_000, 0));
    neighbors.insert(Facing::South, EnergyBuffer::new(10_000, 1_000, 0));

    machine.update(&mut neighbors);
    // 600 over six sides is 100 each, cut to the 80 extract rate.
    assert_eq!(neighbors[&Facing::Down].energy_stored(), 80);
    assert_eq!(neighbors[&Facing::South].energy_stored(), 80);
    assert_eq!(machine.storage().energy_stored(), 440);
}

#[test]
fn sharing_can_be_switched_off() {
    let config = MachinesConfig {
        share_energy: false,
        ..MachinesConfig::default()
    };
    let mut machine = generator_with(&config);
    machine.storage_mut().set_energy(600);

    let mut neighbors = BTreeMap::new();
    neighbors.insert(Facing::Up, EnergyBuffer::new(10_000, 1_000, 0));
    machine.update(&mut neighbors);

    assert_eq!(neighbors[&Facing::Up].energy_stored(), 0);
    assert_eq!(machine.storage().energy_stored(), 600);
}

#[test]
fn buffer_refuses_outside_energy() {
    let mut machine = generator();
    let storage = machine.energy_storage(Facing::East).expect("energy exposed");
    assert!(!storage.can_receive());
    assert_eq!(storage.receive_energy(500, false), 0);
    assert_eq!(storage.max_energy_stored(), 60_000);
}

#[test]
fn observer_sync_carries_burn_times_but_not_slots() {
    let mut machine = generator();
    machine.base_mut().inventory_mut().set(FUEL_SLOT, coal(4));
    machine.update(&mut NoNeighbors);

    let tag = machine.write_tag(SyncMode::SyncToObservers);
    assert_eq!(tag.get_int("BurnTime"), 1599);
    assert_eq!(tag.get_int("MaxBurnTime"), 1600);
    assert_eq!(tag.get_int("Energy"), 30);
    assert!(!tag.contains_key("Items"));

    let mut client = generator();
    client.read_tag(&tag, SyncMode::SyncToObservers);
    assert_eq!(client.burning_scaled(1600), 1599);
    assert!(client.fuel().is_empty());
}

#[test]
fn micro_generator_feeds_battery_snapshot() {
    struct State {
        generator: CoalGenerator,
        neighbors: BTreeMap<Facing, EnergyBuffer>,
        dirty: bool,
        synced: bool,
    }

    #[derive(Debug, Clone, Serialize)]
    struct Snap {
        state: BurnState,
        burn_time: u32,
        energy: u32,
        fuel: u32,
        battery: u32,
        dirty: bool,
        synced: bool,
    }

    let mut generator = generator();
    generator.base_mut().inventory_mut().set(FUEL_SLOT, coal(1));
    generator.take_dirty();

    let mut neighbors = BTreeMap::new();
    neighbors.insert(Facing::East, EnergyBuffer::new(1_000, 1_000, 0));

    run_micro_worldtest(
        MicroWorldtestConfig {
            name: "micro_generator_feeds_battery".to_string(),
            ticks: 5,
            snapshot_path: snapshot_path("micro_generator_feeds_battery.json"),
        },
        State {
            generator,
            neighbors,
            dirty: false,
            synced: false,
        },
        |_, state| {
            state.generator.update(&mut state.neighbors);
            state.dirty = state.generator.take_dirty();
            state.synced = state.generator.take_sync_request();
        },
        |_, state| Snap {
            state: state.generator.state(),
            burn_time: state.generator.current_burn_time(),
            energy: state.generator.storage().energy_stored(),
            fuel: state.generator.fuel().count,
            battery: state.neighbors[&Facing::East].energy_stored(),
            dirty: state.dirty,
            synced: state.synced,
        },
    )
    .expect("snapshot matches");
}
