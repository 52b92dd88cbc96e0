#![warn(missing_docs)]
//! Machines, inventories and items of the powerworks content set.
//!
//! Everything here is driven by a host tick loop it does not own. The host
//! calls [`BlockEntity::update`] once per tick, drains the dirty and sync
//! flags afterwards, and asks for tags through [`BlockEntity::write_tag`].
//! World lookups go through [`WorldAccess`] and [`EnergyNeighbors`]; nothing
//! in this crate holds a reference to a live world.

pub mod block_entity;
pub mod coal_generator;
pub mod config;
pub mod energy;
pub mod fuel;
pub mod inventory;
pub mod laser_wrench;
pub mod persist;
pub mod relay_network;
pub mod world;

pub use block_entity::{BlockEntity, InventoryBlockEntity, SlotPolicy, SyncMode, TileHooks};
pub use coal_generator::{BurnState, CoalGenerator, CoalGeneratorSlots};
pub use config::{GeneratorConfig, MachinesConfig, RelayConfig};
pub use energy::{
    share_energy, transfer_energy, AdjacentStorages, EnergyBuffer, EnergyNeighbors, EnergyStorage, NoNeighbors,
};
pub use fuel::FuelTable;
pub use inventory::{InventoryHooks, ItemHandler, Permissive, SlotInventory};
pub use laser_wrench::{LaserWrench, LinkOutcome};
pub use relay_network::{Connection, ConnectionRegistry, RelayNetwork};
pub use world::{MessageSink, WorldAccess};
