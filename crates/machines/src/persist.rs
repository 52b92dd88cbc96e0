//! Slot array <-> tag conversion.
//!
//! Slots are stored under [`ITEMS_KEY`] as a list with one compound per slot,
//! in slot order. Empty slots are written as empty compounds so indices line
//! up on load.

use powerworks_core::{Compound, ItemStack, Tag};

/// Key holding the slot list.
pub const ITEMS_KEY: &str = "Items";

/// Write `slots` into `tag`. An inventory with no slots writes nothing.
pub fn save_slots(slots: &[ItemStack], tag: &mut Compound) {
    if slots.is_empty() {
        return;
    }
    let list = slots
        .iter()
        .map(|stack| Tag::Compound(stack.write_to()))
        .collect();
    tag.put_list(ITEMS_KEY, list);
}

/// Read `len` slots from `tag`.
///
/// A missing list, a short list, or an entry that is not a compound with an
/// `id` all load as empty slots.
pub fn load_slots(tag: &Compound, len: usize) -> Vec<ItemStack> {
    let list = tag.get_list(ITEMS_KEY);
    (0..len)
        .map(|index| {
            list.get(index)
                .and_then(Tag::as_compound)
                .filter(|entry| entry.contains_key("id"))
                .map(ItemStack::read_from)
                .unwrap_or_else(ItemStack::empty)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerworks_core::ItemId;

    fn coal(count: u32) -> ItemStack {
        ItemStack::new(ItemId::parse("minecraft:coal").expect("valid id"), count)
    }

    #[test]
    fn empty_slots_keep_their_index() {
        let slots = vec![ItemStack::empty(), coal(5), ItemStack::empty()];
        let mut tag = Compound::new();
        save_slots(&slots, &mut tag);

        assert_eq!(tag.get_list(ITEMS_KEY).len(), 3);
        assert_eq!(load_slots(&tag, 3), slots);
    }

    #[test]
    fn zero_slots_write_nothing() {
        let mut tag = Compound::new();
        save_slots(&[], &mut tag);
        assert!(tag.is_empty());
    }

    #[test]
    fn malformed_entries_load_as_empty() {
        let mut tag = Compound::new();
        tag.put_list(
            ITEMS_KEY,
            vec![
                Tag::Int(3),
                Tag::Compound(coal(2).write_to()),
                Tag::Compound(Compound::new()),
            ],
        );

        let loaded = load_slots(&tag, 5);
        assert_eq!(
            loaded,
            vec![
                ItemStack::empty(),
                coal(2),
                ItemStack::empty(),
                ItemStack::empty(),
                ItemStack::empty(),
            ]
        );
    }

    #[test]
    fn missing_list_loads_all_empty() {
        let mut tag = Compound::new();
        tag.put_int(ITEMS_KEY, 7);
        assert!(load_slots(&tag, 2).iter().all(ItemStack::is_empty));
    }
}
