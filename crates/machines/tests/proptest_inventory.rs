//! Property tests for slot inventories, energy buffers and slot persistence.
//!
//! - Simulated insert/extract answer exactly what the real call does
//! - Inserting nothing never changes anything
//! - A slot at its limit accepts nothing
//! - Energy transfers respect rate limits and free space
//! - Persisted slots load back unchanged

use powerworks_core::{Compound, DimensionId, ItemId, ItemStack, WorldPos};
use powerworks_machines::block_entity::{BlockEntity, InventoryBlockEntity, SyncMode};
use powerworks_machines::{EnergyBuffer, EnergyStorage, MachinesConfig, Permissive, SlotInventory};
use proptest::prelude::*;

fn item_stack() -> impl Strategy<Value = ItemStack> {
    (
        prop_oneof![
            Just("coal"),
            Just("stick"),
            Just("ender_pearl"),
            Just("powerworks:laser_wrench"),
        ],
        1u32..=64,
    )
        .prop_map(|(path, count)| {
            let id = ItemId::parse(path).expect("valid id");
            let max = id.max_stack_size();
            ItemStack::new(id, count.min(max))
        })
}

fn slot_contents() -> impl Strategy<Value = Vec<ItemStack>> {
    prop::collection::vec(prop_oneof![Just(ItemStack::empty()), item_stack()], 1..6)
}

fn filled(contents: &[ItemStack]) -> SlotInventory {
    let mut inventory = SlotInventory::new(contents.len());
    for (slot, stack) in contents.iter().enumerate() {
        inventory.set(slot, stack.clone());
    }
    inventory
}

proptest! {
    /// Property: a simulated insert predicts the real one and changes nothing
    #[test]
    fn simulated_insert_matches_real(
        contents in slot_contents(),
        proposed in item_stack(),
        slot_seed in any::<usize>(),
    ) {
        let slot = slot_seed % contents.len();
        let mut inventory = filled(&contents);

        let predicted = inventory.insert(slot, proposed.clone(), true, false);
        prop_assert_eq!(inventory.stacks(), &contents[..]);

        let remainder = inventory.insert(slot, proposed.clone(), false, false);
        prop_assert_eq!(&predicted, &remainder);

        let inserted = proposed.count - remainder.count;
        let before = if contents[slot].is_empty() { 0 } else { contents[slot].count };
        if inserted > 0 {
            prop_assert_eq!(inventory.get(slot).count, before + inserted);
            prop_assert!(inventory.get(slot).count <= proposed.max_stack_size());
        }
    }

    /// Property: a simulated extract predicts the real one and changes nothing
    #[test]
    fn simulated_extract_matches_real(
        contents in slot_contents(),
        amount in 0u32..80,
        slot_seed in any::<usize>(),
    ) {
        let slot = slot_seed % contents.len();
        let mut inventory = filled(&contents);

        let predicted = inventory.extract(slot, amount, true, true);
        prop_assert_eq!(inventory.stacks(), &contents[..]);

        let extracted = inventory.extract(slot, amount, false, true);
        prop_assert_eq!(&predicted, &extracted);
        prop_assert!(extracted.count <= amount);

        let before = if contents[slot].is_empty() { 0 } else { contents[slot].count };
        let after = if inventory.get(slot).is_empty() { 0 } else { inventory.get(slot).count };
        prop_assert_eq!(before, after + extracted.count);
    }

    /// Property: inserting the empty stack is a no-op
    #[test]
    fn empty_insert_is_idempotent(contents in slot_contents(), slot_seed in any::<usize>()) {
        let slot = slot_seed % contents.len();
        let mut inventory = filled(&contents);
        let remainder = inventory.insert(slot, ItemStack::empty(), false, true);
        prop_assert!(remainder.is_empty());
        prop_assert_eq!(inventory.stacks(), &contents[..]);
    }

    /// Property: a full slot hands the proposed stack straight back
    #[test]
    fn full_slot_rejects_everything(stack in item_stack()) {
        let full = stack.copy_with_count(stack.max_stack_size());
        let mut inventory = SlotInventory::new(1);
        inventory.set(0, full.clone());

        let remainder = inventory.insert(0, stack.clone(), false, false);
        prop_assert_eq!(&remainder, &stack);
        prop_assert_eq!(inventory.get(0), &full);
    }

    /// Property: receive and extract never exceed rate, room or contents
    #[test]
    fn energy_transfers_are_capped(
        capacity in 0u32..100_000,
        max_receive in 0u32..1_000,
        max_extract in 0u32..1_000,
        initial in 0u32..100_000,
        request in 0u32..5_000,
    ) {
        let mut buffer = EnergyBuffer::new(capacity, max_receive, max_extract);
        buffer.set_energy(initial);
        let stored = buffer.energy_stored();
        prop_assert!(stored <= capacity);

        let received = buffer.receive_energy(request, false);
        prop_assert!(received <= max_receive && received <= capacity - stored);
        prop_assert_eq!(buffer.energy_stored(), stored + received);

        let stored = buffer.energy_stored();
        let extracted = buffer.extract_energy(request, false);
        prop_assert_eq!(extracted, request.min(stored).min(max_extract));
    }

    /// Property: persisting and reloading slots is lossless
    #[test]
    fn persisted_slots_reload(contents in slot_contents(), powered in any::<bool>()) {
        let pos = WorldPos::new(DimensionId::NETHER, -3, 40, 12);
        let config = MachinesConfig::default();
        let mut entity = InventoryBlockEntity::new("chest", pos, contents.len(), Permissive, &config);
        for (slot, stack) in contents.iter().enumerate() {
            entity.inventory_mut().set(slot, stack.clone());
        }
        entity.set_redstone_powered(powered);

        let tag: Compound = entity.write_tag(SyncMode::PersistToStorage);
        let bytes = powerworks_core::tag::encode(&tag).expect("encodes");
        let decoded = powerworks_core::tag::decode(&bytes).expect("decodes");

        let mut loaded = InventoryBlockEntity::new("chest", pos, contents.len(), Permissive, &config);
        loaded.read_tag(&decoded, SyncMode::PersistToStorage);
        prop_assert_eq!(loaded.inventory().stacks(), &contents[..]);
        prop_assert_eq!(loaded.is_redstone_powered(), powered);
    }
}
