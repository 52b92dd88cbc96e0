//! Inventory-backed block entity base.
//!
//! [`InventoryBlockEntity`] owns one [`SlotInventory`] whose hooks are a
//! [`TileHooks`] wrapping the machine's [`SlotPolicy`]. Every real inventory
//! mutation lands in [`TileHooks::on_changed`], which raises the dirty flag
//! and, for policies that mirror their slots to observers, a sync request.
//! The host drains both flags after each tick.

use crate::config::MachinesConfig;
use crate::energy::{EnergyNeighbors, EnergyStorage};
use crate::inventory::{InventoryHooks, ItemHandler, Permissive, SlotInventory, DEFAULT_SLOT_LIMIT};
use crate::persist::{load_slots, save_slots};
use powerworks_core::{Compound, Facing, ItemStack, WorldPos};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Tag key for the redstone flag.
pub const REDSTONE_KEY: &str = "Redstone";
/// Tag key for the tick counter.
pub const TICKS_KEY: &str = "TicksElapsed";

/// Purpose of a tag write or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncMode {
    /// Full state for world storage.
    PersistToStorage,
    /// Incremental state pushed to observing clients.
    SyncToObservers,
    /// The one-off packet sent when a client first loads the block.
    SyncOnStorageLoad,
}

/// Per-machine slot rules.
pub trait SlotPolicy {
    /// Whether `stack` may enter `slot`.
    fn can_insert(&self, _slot: usize, _stack: &ItemStack, _automation: bool) -> bool {
        true
    }

    /// Whether `stack` may leave `slot`.
    fn can_extract(&self, _slot: usize, _stack: &ItemStack, _automation: bool) -> bool {
        true
    }

    /// Slot capacity.
    fn max_stack_size(&self, _slot: usize) -> u32 {
        DEFAULT_SLOT_LIMIT
    }

    /// Whether slot contents are part of observer syncs.
    fn should_sync_slots(&self) -> bool {
        false
    }
}

impl SlotPolicy for Permissive {}

/// Adapts a [`SlotPolicy`] to inventory hooks and records change flags.
#[derive(Debug, Clone)]
pub struct TileHooks<P> {
    policy: P,
    dirty: bool,
    sync_requested: bool,
}

impl<P: SlotPolicy> TileHooks<P> {
    fn new(policy: P) -> Self {
        Self {
            policy,
            dirty: false,
            sync_requested: false,
        }
    }

    /// The wrapped policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn request_sync(&mut self) {
        self.sync_requested = true;
    }
}

impl<P: SlotPolicy> InventoryHooks for TileHooks<P> {
    fn can_accept(&self, slot: usize, stack: &ItemStack, from_automation: bool) -> bool {
        self.policy.can_insert(slot, stack, from_automation)
    }

    fn can_remove(&self, slot: usize, stack: &ItemStack, by_automation: bool) -> bool {
        self.policy.can_extract(slot, stack, by_automation)
    }

    fn slot_limit(&self, slot: usize) -> u32 {
        self.policy.max_stack_size(slot)
    }

    fn on_changed(&mut self, slot: usize) {
        trace!(slot, "inventory slot changed");
        self.mark_dirty();
        if self.policy.should_sync_slots() {
            self.request_sync();
        }
    }
}

/// Shared state of every block entity holding items.
#[derive(Debug, Clone)]
pub struct InventoryBlockEntity<P> {
    name: String,
    pos: WorldPos,
    redstone_powered: bool,
    ticks_elapsed: u32,
    sync_interval: u32,
    inventory: SlotInventory<TileHooks<P>>,
}

impl<P: SlotPolicy> InventoryBlockEntity<P> {
    /// A block entity with `slots` empty slots governed by `policy`.
    pub fn new(
        name: impl Into<String>,
        pos: WorldPos,
        slots: usize,
        policy: P,
        config: &MachinesConfig,
    ) -> Self {
        Self {
            name: name.into(),
            pos,
            redstone_powered: false,
            ticks_elapsed: 0,
            sync_interval: config.sync_interval_ticks.max(1),
            inventory: SlotInventory::with_hooks(slots, TileHooks::new(policy)),
        }
    }

    /// Registry name of the block.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the block lives.
    pub fn pos(&self) -> WorldPos {
        self.pos
    }

    /// The owned inventory.
    pub fn inventory(&self) -> &SlotInventory<TileHooks<P>> {
        &self.inventory
    }

    /// Mutable access to the owned inventory.
    pub fn inventory_mut(&mut self) -> &mut SlotInventory<TileHooks<P>> {
        &mut self.inventory
    }

    /// The machine's slot rules.
    pub fn policy(&self) -> &P {
        self.inventory.hooks().policy()
    }

    /// Ticks run since placement or load.
    pub fn ticks_elapsed(&self) -> u32 {
        self.ticks_elapsed
    }

    /// Throttle interval for [`Self::send_update_with_interval`].
    pub fn sync_interval(&self) -> u32 {
        self.sync_interval
    }

    /// Advance the tick counter. Called once at the start of each update.
    pub fn tick(&mut self) {
        self.ticks_elapsed = self.ticks_elapsed.wrapping_add(1);
    }

    /// Whether a redstone signal inhibits the machine.
    pub fn is_redstone_powered(&self) -> bool {
        self.redstone_powered
    }

    /// Record a neighbour redstone change.
    pub fn set_redstone_powered(&mut self, powered: bool) {
        if self.redstone_powered != powered {
            self.redstone_powered = powered;
            self.mark_dirty();
        }
    }

    /// Flag the block for saving.
    pub fn mark_dirty(&mut self) {
        self.inventory.hooks_mut().mark_dirty();
    }

    /// Whether state changed since the last save.
    pub fn is_dirty(&self) -> bool {
        self.inventory.hooks().dirty
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.inventory.hooks_mut().dirty)
    }

    /// Ask the host to push state to observers.
    pub fn send_update(&mut self) {
        self.inventory.hooks_mut().request_sync();
    }

    /// Read and clear the pending sync request.
    pub fn take_sync_request(&mut self) -> bool {
        std::mem::take(&mut self.inventory.hooks_mut().sync_requested)
    }

    /// Request a sync only on ticks that are a multiple of the interval.
    ///
    /// Returns whether the request was made.
    pub fn send_update_with_interval(&mut self) -> bool {
        if self.ticks_elapsed % self.sync_interval == 0 {
            self.send_update();
            true
        } else {
            false
        }
    }

    /// Write the shared fields for `mode`.
    pub fn write_base(&self, tag: &mut Compound, mode: SyncMode) {
        if mode == SyncMode::PersistToStorage {
            tag.put_bool(REDSTONE_KEY, self.redstone_powered);
            tag.put_int(TICKS_KEY, self.ticks_elapsed as i32);
        }
        if self.includes_slots(mode) {
            save_slots(self.inventory.stacks(), tag);
        }
    }

    /// Read the shared fields for `mode`. Loading never marks the block dirty.
    pub fn read_base(&mut self, tag: &Compound, mode: SyncMode) {
        if mode == SyncMode::PersistToStorage {
            self.redstone_powered = tag.get_bool(REDSTONE_KEY);
            self.ticks_elapsed = tag.get_int(TICKS_KEY) as u32;
        }
        if self.includes_slots(mode) {
            let slots = load_slots(tag, self.inventory.len());
            self.inventory.load(slots);
        }
    }

    fn includes_slots(&self, mode: SyncMode) -> bool {
        match mode {
            SyncMode::PersistToStorage => true,
            SyncMode::SyncToObservers => self.policy().should_sync_slots(),
            SyncMode::SyncOnStorageLoad => false,
        }
    }

    /// Comparator output from how full the slots are.
    ///
    /// `floor(14 * mean fill) + 1` when anything is stored, 0 otherwise.
    pub fn default_comparator_signal(&self) -> u8 {
        let slots = self.inventory.stacks();
        if slots.is_empty() {
            return 0;
        }

        let mut fill = 0.0_f64;
        let mut any_item = false;
        for (slot, stack) in slots.iter().enumerate() {
            if stack.is_empty() {
                continue;
            }
            let limit = self.inventory.slot_limit(slot).min(stack.max_stack_size());
            if limit > 0 {
                fill += f64::from(stack.count) / f64::from(limit);
            }
            any_item = true;
        }

        let mean = fill / slots.len() as f64;
        (mean * 14.0).floor().min(14.0) as u8 + u8::from(any_item)
    }
}

/// What the host sees of every machine.
pub trait BlockEntity {
    /// Registry name.
    fn name(&self) -> &str;

    /// Location key.
    fn pos(&self) -> WorldPos;

    /// Run one server tick.
    fn update(&mut self, neighbors: &mut dyn EnergyNeighbors);

    /// Serialize for `mode`.
    fn write_tag(&self, mode: SyncMode) -> Compound;

    /// Restore from a tag written with the same `mode`.
    fn read_tag(&mut self, tag: &Compound, mode: SyncMode);

    /// Comparator output, 0..=15.
    fn comparator_signal(&self) -> u8;

    /// Item access from `facing`. Every side sees the same inventory.
    fn item_handler(&mut self, facing: Facing) -> Option<&mut dyn ItemHandler>;

    /// Energy access from `facing`.
    fn energy_storage(&mut self, _facing: Facing) -> Option<&mut dyn EnergyStorage> {
        None
    }

    /// Neighbour redstone change.
    fn set_redstone_powered(&mut self, powered: bool);

    /// Read and clear the save flag.
    fn take_dirty(&mut self) -> bool;

    /// Read and clear the sync request.
    fn take_sync_request(&mut self) -> bool;
}

impl<P: SlotPolicy> BlockEntity for InventoryBlockEntity<P> {
    fn name(&self) -> &str {
        InventoryBlockEntity::name(self)
    }

    fn pos(&self) -> WorldPos {
        self.pos
    }

    fn update(&mut self, _neighbors: &mut dyn EnergyNeighbors) {
        self.tick();
    }

    fn write_tag(&self, mode: SyncMode) -> Compound {
        let mut tag = Compound::new();
        self.write_base(&mut tag, mode);
        tag
    }

    fn read_tag(&mut self, tag: &Compound, mode: SyncMode) {
        self.read_base(tag, mode);
    }

    fn comparator_signal(&self) -> u8 {
        self.default_comparator_signal()
    }

    fn item_handler(&mut self, _facing: Facing) -> Option<&mut dyn ItemHandler> {
        Some(&mut self.inventory)
    }

    fn set_redstone_powered(&mut self, powered: bool) {
        InventoryBlockEntity::set_redstone_powered(self, powered);
    }

    fn take_dirty(&mut self) -> bool {
        InventoryBlockEntity::take_dirty(self)
    }

    fn take_sync_request(&mut self) -> bool {
        InventoryBlockEntity::take_sync_request(self)
    }
}
