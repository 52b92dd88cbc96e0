//! Energy buffers and the energy interchange contract.

use crate::config::GeneratorConfig;
use powerworks_core::{Compound, Facing, FacingSet, WorldPos};
use std::collections::BTreeMap;

/// Key the stored amount is persisted under.
pub const ENERGY_KEY: &str = "Energy";

/// What a neighbour sees when it asks a block for energy interchange.
pub trait EnergyStorage {
    /// Accept up to `max_receive` units; returns the amount accepted.
    fn receive_energy(&mut self, max_receive: u32, simulate: bool) -> u32;

    /// Hand out up to `max_extract` units; returns the amount removed.
    fn extract_energy(&mut self, max_extract: u32, simulate: bool) -> u32;

    /// Currently stored.
    fn energy_stored(&self) -> u32;

    /// Capacity.
    fn max_energy_stored(&self) -> u32;

    /// Whether [`EnergyStorage::receive_energy`] can ever accept anything.
    fn can_receive(&self) -> bool;

    /// Whether [`EnergyStorage::extract_energy`] can ever hand anything out.
    fn can_extract(&self) -> bool;
}

/// A capacity- and rate-limited energy store.
///
/// The rate limits only apply to the [`EnergyStorage`] side; the owning
/// machine fills and drains through the `_internal` methods. `stored` never
/// exceeds `capacity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyBuffer {
    stored: u32,
    capacity: u32,
    max_receive: u32,
    max_extract: u32,
}

impl EnergyBuffer {
    /// An empty buffer.
    pub fn new(capacity: u32, max_receive: u32, max_extract: u32) -> Self {
        Self {
            stored: 0,
            capacity,
            max_receive,
            max_extract,
        }
    }

    /// An empty buffer sized for a generator.
    pub fn for_generator(config: &GeneratorConfig) -> Self {
        Self::new(config.capacity, config.max_receive, config.max_extract)
    }

    /// Room left before the buffer is full.
    pub fn free_space(&self) -> u32 {
        self.capacity.saturating_sub(self.stored)
    }

    /// True when nothing more fits.
    pub fn is_full(&self) -> bool {
        self.stored >= self.capacity
    }

    /// Per-call receive limit.
    pub fn max_receive(&self) -> u32 {
        self.max_receive
    }

    /// Per-call extract limit.
    pub fn max_extract(&self) -> u32 {
        self.max_extract
    }

    /// Overwrite the stored amount, clamped to capacity.
    pub fn set_energy(&mut self, energy: u32) {
        self.stored = energy.min(self.capacity);
    }

    /// Add energy ignoring the receive rate (production); capped at capacity.
    pub fn receive_internal(&mut self, amount: u32, simulate: bool) -> u32 {
        let accepted = amount.min(self.free_space());
        if !simulate {
            self.stored += accepted;
        }
        accepted
    }

    /// Remove energy ignoring the extract rate (consumption).
    pub fn extract_internal(&mut self, amount: u32, simulate: bool) -> u32 {
        let removed = amount.min(self.stored);
        if !simulate {
            self.stored -= removed;
        }
        removed
    }

    /// Stored amount scaled to `0..=scale` for progress displays.
    pub fn energy_scaled(&self, scale: u32) -> u32 {
        if self.capacity == 0 {
            return 0;
        }
        (u64::from(self.stored) * u64::from(scale) / u64::from(self.capacity)) as u32
    }

    /// Persist the stored amount.
    pub fn write_to(&self, tag: &mut Compound) {
        tag.put_int(ENERGY_KEY, i32::try_from(self.stored).unwrap_or(i32::MAX));
    }

    /// Restore the stored amount; absent reads as 0, oversize is clamped.
    pub fn read_from(&mut self, tag: &Compound) {
        self.set_energy(tag.get_u32(ENERGY_KEY));
    }
}

impl EnergyStorage for EnergyBuffer {
    fn receive_energy(&mut self, max_receive: u32, simulate: bool) -> u32 {
        self.receive_internal(max_receive.min(self.max_receive), simulate)
    }

    fn extract_energy(&mut self, max_extract: u32, simulate: bool) -> u32 {
        self.extract_internal(max_extract.min(self.max_extract), simulate)
    }

    fn energy_stored(&self) -> u32 {
        self.stored
    }

    fn max_energy_stored(&self) -> u32 {
        self.capacity
    }

    fn can_receive(&self) -> bool {
        self.max_receive > 0
    }

    fn can_extract(&self) -> bool {
        self.max_extract > 0
    }
}

/// Host lookup of the energy storages next to a block.
pub trait EnergyNeighbors {
    /// The storage of the block across `facing`, seen from that block's facing side.
    fn neighbor_energy(&mut self, facing: Facing) -> Option<&mut dyn EnergyStorage>;
}

/// A block with nothing around it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNeighbors;

impl EnergyNeighbors for NoNeighbors {
    fn neighbor_energy(&mut self, _facing: Facing) -> Option<&mut dyn EnergyStorage> {
        None
    }
}

impl EnergyNeighbors for BTreeMap<Facing, EnergyBuffer> {
    fn neighbor_energy(&mut self, facing: Facing) -> Option<&mut dyn EnergyStorage> {
        self.get_mut(&facing).map(|buffer| buffer as &mut dyn EnergyStorage)
    }
}

/// Storages placed in the world, looked up around one block.
#[derive(Debug)]
pub struct AdjacentStorages<'a> {
    center: WorldPos,
    storages: &'a mut BTreeMap<WorldPos, EnergyBuffer>,
}

impl<'a> AdjacentStorages<'a> {
    /// View `storages` from the block at `center`.
    pub fn new(center: WorldPos, storages: &'a mut BTreeMap<WorldPos, EnergyBuffer>) -> Self {
        Self { center, storages }
    }
}

impl EnergyNeighbors for AdjacentStorages<'_> {
    fn neighbor_energy(&mut self, facing: Facing) -> Option<&mut dyn EnergyStorage> {
        self.storages
            .get_mut(&self.center.offset(facing))
            .map(|buffer| buffer as &mut dyn EnergyStorage)
    }
}

/// Move at most `max_transfer` units from `from` into `to`.
///
/// Returns the amount moved: the smaller of what `from` would give and what
/// `to` would take.
pub fn transfer_energy(
    from: &mut dyn EnergyStorage,
    to: &mut dyn EnergyStorage,
    max_transfer: u32,
) -> u32 {
    let offered = from.extract_energy(max_transfer, true);
    if offered == 0 {
        return 0;
    }
    let accepted = to.receive_energy(offered, false);
    from.extract_energy(accepted, false);
    accepted
}

/// Split `total` over `sides` and push a share into each neighbour present.
///
/// The share is `total / sides`, or all of `total` when that rounds down to
/// zero. Returns the amount actually moved.
pub fn share_energy(
    source: &mut dyn EnergyStorage,
    total: u32,
    sides: FacingSet,
    neighbors: &mut dyn EnergyNeighbors,
) -> u32 {
    let side_count = sides.count();
    if total == 0 || side_count == 0 {
        return 0;
    }

    let mut share = total / side_count;
    if share == 0 {
        share = total;
    }

    let mut moved = 0;
    for facing in sides.faces() {
        if let Some(neighbor) = neighbors.neighbor_energy(facing) {
            moved += transfer_energy(source, neighbor, share);
        }
    }
    moved
}
