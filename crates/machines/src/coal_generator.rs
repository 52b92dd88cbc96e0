//! Coal-fired power generator.
//!
//! One fuel slot feeds a produce-only [`EnergyBuffer`]. Each tick the
//! generator first lights a new unit of fuel if it is idle, then burns for a
//! tick and adds its production. Stored energy is pushed into neighbouring
//! storages on every side.

use crate::block_entity::{BlockEntity, InventoryBlockEntity, SlotPolicy, SyncMode};
use crate::config::{GeneratorConfig, MachinesConfig};
use crate::energy::{share_energy, EnergyBuffer, EnergyNeighbors, EnergyStorage};
use crate::fuel::FuelTable;
use crate::inventory::ItemHandler;
use powerworks_core::{Compound, Facing, FacingSet, ItemStack, WorldPos};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Registry name.
pub const NAME: &str = "coalGenerator";
/// Index of the only slot.
pub const FUEL_SLOT: usize = 0;

const BURN_TIME_KEY: &str = "BurnTime";
const MAX_BURN_TIME_KEY: &str = "MaxBurnTime";

/// Whether fuel is currently burning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurnState {
    /// Nothing burning.
    Idle,
    /// A unit of fuel is burning.
    Burning,
}

/// Slot rules: only fuel goes in, and automation may only pull out non-fuel.
#[derive(Debug, Clone)]
pub struct CoalGeneratorSlots {
    fuels: Arc<FuelTable>,
}

impl CoalGeneratorSlots {
    /// Rules backed by `fuels`.
    pub fn new(fuels: Arc<FuelTable>) -> Self {
        Self { fuels }
    }

    /// The fuel table in use.
    pub fn fuels(&self) -> &FuelTable {
        &self.fuels
    }
}

impl SlotPolicy for CoalGeneratorSlots {
    fn can_insert(&self, _slot: usize, stack: &ItemStack, _automation: bool) -> bool {
        self.fuels.is_fuel(stack)
    }

    fn can_extract(&self, _slot: usize, stack: &ItemStack, automation: bool) -> bool {
        !automation || !self.fuels.is_fuel(stack)
    }
}

/// Burns fuel from one slot into an energy buffer.
#[derive(Debug, Clone)]
pub struct CoalGenerator {
    base: InventoryBlockEntity<CoalGeneratorSlots>,
    storage: EnergyBuffer,
    production: u32,
    share_energy: bool,
    max_burn_time: u32,
    current_burn_time: u32,
    last_energy: u32,
    last_max_burn_time: u32,
    last_current_burn_time: u32,
    last_compare: u8,
}

impl CoalGenerator {
    /// A fresh, empty, idle generator at `pos`.
    pub fn new(
        pos: WorldPos,
        fuels: Arc<FuelTable>,
        machines: &MachinesConfig,
        generator: &GeneratorConfig,
    ) -> Self {
        Self {
            base: InventoryBlockEntity::new(NAME, pos, 1, CoalGeneratorSlots::new(fuels), machines),
            storage: EnergyBuffer::for_generator(generator),
            production: generator.production_per_tick,
            share_energy: machines.share_energy,
            max_burn_time: 0,
            current_burn_time: 0,
            last_energy: 0,
            last_max_burn_time: 0,
            last_current_burn_time: 0,
            last_compare: 0,
        }
    }

    /// Shared block-entity state.
    pub fn base(&self) -> &InventoryBlockEntity<CoalGeneratorSlots> {
        &self.base
    }

    /// Mutable shared block-entity state.
    pub fn base_mut(&mut self) -> &mut InventoryBlockEntity<CoalGeneratorSlots> {
        &mut self.base
    }

    /// The energy buffer.
    pub fn storage(&self) -> &EnergyBuffer {
        &self.storage
    }

    /// Mutable access to the energy buffer.
    pub fn storage_mut(&mut self) -> &mut EnergyBuffer {
        &mut self.storage
    }

    /// Contents of the fuel slot.
    pub fn fuel(&self) -> &ItemStack {
        self.base.inventory().get(FUEL_SLOT)
    }

    /// Ticks left on the burning unit.
    pub fn current_burn_time(&self) -> u32 {
        self.current_burn_time
    }

    /// Total ticks of the last unit lit.
    pub fn max_burn_time(&self) -> u32 {
        self.max_burn_time
    }

    /// Idle or burning.
    pub fn state(&self) -> BurnState {
        if self.current_burn_time > 0 {
            BurnState::Burning
        } else {
            BurnState::Idle
        }
    }

    /// Stored energy scaled to `0..=scale`.
    pub fn energy_scaled(&self, scale: u32) -> u32 {
        self.storage.energy_scaled(scale)
    }

    /// Remaining burn scaled to `0..=scale`; 0 before anything was lit.
    pub fn burning_scaled(&self, scale: u32) -> u32 {
        if self.max_burn_time == 0 {
            return 0;
        }
        (u64::from(self.current_burn_time) * u64::from(scale) / u64::from(self.max_burn_time))
            as u32
    }

    fn compare(&self) -> u8 {
        let capacity = self.storage.max_energy_stored();
        if capacity == 0 {
            return 0;
        }
        (u64::from(self.storage.energy_stored()) * 15 / u64::from(capacity)) as u8
    }

    fn try_ignite(&mut self) {
        if self.base.is_redstone_powered() || self.current_burn_time > 0 || self.storage.is_full() {
            return;
        }
        let burn = self.base.policy().fuels().burn_time(self.fuel());
        if burn == 0 {
            return;
        }

        self.max_burn_time = burn;
        self.current_burn_time = burn;
        self.base.inventory_mut().shrink(FUEL_SLOT, 1);
        debug!(pos = %self.base.pos(), burn, "generator lit fuel");
    }

    fn burn(&mut self) {
        if self.current_burn_time > 0 {
            self.current_burn_time -= 1;
            self.storage.receive_internal(self.production, false);
        }
    }
}

impl BlockEntity for CoalGenerator {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn pos(&self) -> WorldPos {
        self.base.pos()
    }

    fn update(&mut self, neighbors: &mut dyn EnergyNeighbors) {
        self.base.tick();

        if self.share_energy {
            let stored = self.storage.energy_stored();
            share_energy(&mut self.storage, stored, FacingSet::all(), neighbors);
        }

        let was_burning = self.state() == BurnState::Burning;
        self.try_ignite();
        self.burn();

        let compare = self.compare();
        let burning = self.state() == BurnState::Burning;
        if was_burning != burning || self.last_compare != compare {
            if was_burning != burning {
                debug!(pos = %self.base.pos(), ?burning, "generator state changed");
            }
            self.last_compare = compare;
            self.base.mark_dirty();
        }

        let energy = self.storage.energy_stored();
        let changed = energy != self.last_energy
            || self.current_burn_time != self.last_current_burn_time
            || self.max_burn_time != self.last_max_burn_time;
        if changed && self.base.send_update_with_interval() {
            self.last_energy = energy;
            self.last_current_burn_time = self.current_burn_time;
            self.last_max_burn_time = self.max_burn_time;
        }
    }

    fn write_tag(&self, mode: SyncMode) -> Compound {
        let mut tag = Compound::new();
        self.base.write_base(&mut tag, mode);
        if mode != SyncMode::SyncOnStorageLoad {
            tag.put_int(BURN_TIME_KEY, i32::try_from(self.current_burn_time).unwrap_or(i32::MAX));
            tag.put_int(MAX_BURN_TIME_KEY, i32::try_from(self.max_burn_time).unwrap_or(i32::MAX));
        }
        self.storage.write_to(&mut tag);
        tag
    }

    fn read_tag(&mut self, tag: &Compound, mode: SyncMode) {
        self.base.read_base(tag, mode);
        if mode != SyncMode::SyncOnStorageLoad {
            self.current_burn_time = tag.get_u32(BURN_TIME_KEY);
            self.max_burn_time = tag.get_u32(MAX_BURN_TIME_KEY);
        }
        self.storage.read_from(tag);
    }

    fn comparator_signal(&self) -> u8 {
        self.compare()
    }

    fn item_handler(&mut self, facing: Facing) -> Option<&mut dyn ItemHandler> {
        self.base.item_handler(facing)
    }

    fn energy_storage(&mut self, _facing: Facing) -> Option<&mut dyn EnergyStorage> {
        Some(&mut self.storage)
    }

    fn set_redstone_powered(&mut self, powered: bool) {
        self.base.set_redstone_powered(powered);
    }

    fn take_dirty(&mut self) -> bool {
        self.base.take_dirty()
    }

    fn take_sync_request(&mut self) -> bool {
        self.base.take_sync_request()
    }
}
