//! Capacity-limited, policy-gated slot inventory.
//!
//! A [`SlotInventory`] owns a fixed number of slots. Every insert and extract
//! goes through its [`InventoryHooks`], which decide what a slot accepts, what
//! may be taken out, how much a slot holds, and get told about every real
//! mutation. Simulated calls compute the same answer without touching the
//! slots or the hooks.

use powerworks_core::ItemStack;
use std::ops::Range;

/// Slot limit used when a hook does not override it.
pub const DEFAULT_SLOT_LIMIT: u32 = 64;

/// Per-slot rules and change notification for a [`SlotInventory`].
pub trait InventoryHooks {
    /// Whether `stack` may be placed into `slot`.
    fn can_accept(&self, _slot: usize, _stack: &ItemStack, _from_automation: bool) -> bool {
        true
    }

    /// Whether the current `stack` in `slot` may be taken out.
    fn can_remove(&self, _slot: usize, _stack: &ItemStack, _by_automation: bool) -> bool {
        true
    }

    /// Largest count `slot` holds, before the item's own stack limit.
    fn slot_limit(&self, _slot: usize) -> u32 {
        DEFAULT_SLOT_LIMIT
    }

    /// Called exactly once per mutating call, never for simulated ones.
    fn on_changed(&mut self, _slot: usize) {}
}

/// Hooks that accept everything and ignore changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissive;

impl InventoryHooks for Permissive {}

/// Fixed-length slot array gated by hooks.
#[derive(Debug, Clone)]
pub struct SlotInventory<H = Permissive> {
    slots: Vec<ItemStack>,
    hooks: H,
}

impl SlotInventory<Permissive> {
    /// An inventory with permissive hooks.
    pub fn new(len: usize) -> Self {
        Self::with_hooks(len, Permissive)
    }
}

/// How many of `stack` fit into `slot` given its current contents.
fn accepted_count<H: InventoryHooks>(
    hooks: &H,
    existing: &ItemStack,
    slot: usize,
    stack: &ItemStack,
    from_automation: bool,
) -> u32 {
    if stack.is_empty() || !hooks.can_accept(slot, stack, from_automation) {
        return 0;
    }

    let mut limit = hooks.slot_limit(slot).min(stack.max_stack_size());
    if !existing.is_empty() {
        if !existing.stacks_with(stack) {
            return 0;
        }
        limit = limit.saturating_sub(existing.count);
    }

    limit.min(stack.count)
}

impl<H: InventoryHooks> SlotInventory<H> {
    /// An inventory of `len` empty slots using `hooks`.
    pub fn with_hooks(len: usize, hooks: H) -> Self {
        Self {
            slots: vec![ItemStack::empty(); len],
            hooks,
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(ItemStack::is_empty)
    }

    /// Contents of `slot`.
    ///
    /// # Panics
    /// When `slot` is out of range.
    pub fn get(&self, slot: usize) -> &ItemStack {
        &self.slots[slot]
    }

    /// All slots in index order.
    pub fn stacks(&self) -> &[ItemStack] {
        &self.slots
    }

    /// The hooks gating this inventory.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Mutable access to the hooks.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Largest count `slot` holds.
    pub fn slot_limit(&self, slot: usize) -> u32 {
        self.hooks.slot_limit(slot)
    }

    /// Replace the contents of `slot`, bypassing policy.
    pub fn set(&mut self, slot: usize, stack: ItemStack) {
        self.slots[slot] = stack;
        self.hooks.on_changed(slot);
    }

    /// Remove `amount` items from `slot` for the owner's own use, bypassing policy.
    ///
    /// Returns the number actually removed; only a non-zero removal notifies.
    pub fn shrink(&mut self, slot: usize, amount: u32) -> u32 {
        let removed = amount.min(self.slots[slot].count);
        if removed > 0 {
            self.slots[slot].shrink(removed);
            self.hooks.on_changed(slot);
        }
        removed
    }

    /// Place as much of `stack` into `slot` as policy and limits allow.
    ///
    /// Returns the part that did not fit (the empty stack when all of it did).
    pub fn insert(
        &mut self,
        slot: usize,
        stack: ItemStack,
        simulate: bool,
        from_automation: bool,
    ) -> ItemStack {
        let accepted = accepted_count(
            &self.hooks,
            &self.slots[slot],
            slot,
            &stack,
            from_automation,
        );
        if accepted == 0 {
            return stack;
        }

        if !simulate {
            let existing = &mut self.slots[slot];
            if existing.is_empty() {
                *existing = stack.copy_with_count(accepted);
            } else {
                existing.grow(accepted);
            }
            self.hooks.on_changed(slot);
        }

        stack.copy_with_count(stack.count - accepted)
    }

    /// Take up to `amount` items out of `slot` if policy allows.
    ///
    /// Returns what was removed (the empty stack when nothing was).
    pub fn extract(
        &mut self,
        slot: usize,
        amount: u32,
        simulate: bool,
        by_automation: bool,
    ) -> ItemStack {
        let existing = &self.slots[slot];
        if amount == 0
            || existing.is_empty()
            || !self.hooks.can_remove(slot, existing, by_automation)
        {
            return ItemStack::empty();
        }

        let take = amount.min(existing.max_stack_size()).min(existing.count);
        if simulate {
            return existing.copy_with_count(take);
        }

        let taken = self.slots[slot].split(take);
        self.hooks.on_changed(slot);
        taken
    }

    /// Index of the first slot holding anything.
    pub fn first_filled(&self) -> Option<usize> {
        self.slots.iter().position(|stack| !stack.is_empty())
    }

    /// Spread each stack over the slots in index order.
    ///
    /// Returns the non-empty leftovers, in input order.
    pub fn insert_all(
        &mut self,
        stacks: &[ItemStack],
        simulate: bool,
        from_automation: bool,
    ) -> Vec<ItemStack> {
        self.insert_range(stacks, 0..self.slots.len(), simulate, from_automation)
    }

    /// Like [`Self::insert_all`], restricted to the slots in `slots`.
    ///
    /// The range is clipped to the inventory; an empty range takes nothing.
    pub fn insert_range(
        &mut self,
        stacks: &[ItemStack],
        slots: Range<usize>,
        simulate: bool,
        from_automation: bool,
    ) -> Vec<ItemStack> {
        let slots = self.clip(slots);
        if simulate {
            return self.leftovers_after(stacks, slots, from_automation);
        }

        let mut leftovers = Vec::new();
        for stack in stacks {
            let mut remaining = stack.clone();
            for slot in slots.clone() {
                if remaining.is_empty() {
                    break;
                }
                remaining = self.insert(slot, remaining, false, from_automation);
            }
            if !remaining.is_empty() {
                leftovers.push(remaining);
            }
        }
        leftovers
    }

    /// True when every stack would fit completely, each one seeing the slots
    /// as earlier stacks left them.
    pub fn can_insert_all(&self, stacks: &[ItemStack], from_automation: bool) -> bool {
        self.can_insert_range(stacks, 0..self.slots.len(), from_automation)
    }

    /// [`Self::can_insert_all`] restricted to the slots in `slots`.
    pub fn can_insert_range(
        &self,
        stacks: &[ItemStack],
        slots: Range<usize>,
        from_automation: bool,
    ) -> bool {
        self.leftovers_after(stacks, self.clip(slots), from_automation)
            .is_empty()
    }

    fn clip(&self, slots: Range<usize>) -> Range<usize> {
        let end = slots.end.min(self.slots.len());
        slots.start.min(end)..end
    }

    fn leftovers_after(
        &self,
        stacks: &[ItemStack],
        slots: Range<usize>,
        from_automation: bool,
    ) -> Vec<ItemStack> {
        let mut scratch = self.slots.clone();
        let mut leftovers = Vec::new();

        for stack in stacks {
            let mut remaining = stack.count;
            for slot in slots.clone() {
                if remaining == 0 {
                    break;
                }
                let existing = &mut scratch[slot];
                let candidate = stack.copy_with_count(remaining);
                let accepted =
                    accepted_count(&self.hooks, existing, slot, &candidate, from_automation);
                if accepted == 0 {
                    continue;
                }
                if existing.is_empty() {
                    *existing = stack.copy_with_count(accepted);
                } else {
                    existing.grow(accepted);
                }
                remaining -= accepted;
            }
            if remaining > 0 {
                leftovers.push(stack.copy_with_count(remaining));
            }
        }

        leftovers
    }

    /// Empty every slot, notifying once per slot that held something.
    pub fn clear(&mut self) {
        for slot in 0..self.slots.len() {
            if !self.slots[slot].is_empty() {
                self.slots[slot] = ItemStack::empty();
                self.hooks.on_changed(slot);
            }
        }
    }

    /// Replace every slot from a loaded array without notifying.
    ///
    /// Extra entries are dropped and missing ones become empty, so the length
    /// never changes. Counts above a slot's limit are cut down to it.
    pub(crate) fn load(&mut self, stacks: Vec<ItemStack>) {
        let len = self.slots.len();
        self.slots = stacks;
        self.slots.resize(len, ItemStack::empty());
        for (slot, stack) in self.slots.iter_mut().enumerate() {
            let limit = self.hooks.slot_limit(slot).min(stack.max_stack_size());
            if stack.count > limit {
                *stack = stack.copy_with_count(limit);
            }
        }
    }
}

/// Side-facing access to an inventory, as used by neighbouring automation.
///
/// All calls count as automated access.
pub trait ItemHandler {
    /// Number of slots.
    fn slots(&self) -> usize;

    /// Contents of `slot`.
    fn stack_in_slot(&self, slot: usize) -> &ItemStack;

    /// Insert into `slot`, returning the part that did not fit.
    fn insert_item(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> ItemStack;

    /// Extract up to `amount` from `slot`.
    fn extract_item(&mut self, slot: usize, amount: u32, simulate: bool) -> ItemStack;

    /// Largest count `slot` holds.
    fn slot_limit(&self, slot: usize) -> u32;
}

impl<H: InventoryHooks> ItemHandler for SlotInventory<H> {
    fn slots(&self) -> usize {
        self.len()
    }

    fn stack_in_slot(&self, slot: usize) -> &ItemStack {
        self.get(slot)
    }

    fn insert_item(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> ItemStack {
        self.insert(slot, stack, simulate, true)
    }

    fn extract_item(&mut self, slot: usize, amount: u32, simulate: bool) -> ItemStack {
        self.extract(slot, amount, simulate, true)
    }

    fn slot_limit(&self, slot: usize) -> u32 {
        SlotInventory::slot_limit(self, slot)
    }
}
