//! Burn values for furnace fuels.

use powerworks_core::{ItemId, ItemStack};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vanilla burn times in ticks.
const VANILLA_FUELS: &[(&str, u32)] = &[
    ("coal", 1600),
    ("coal_block", 16_000),
    ("lava_bucket", 20_000),
    ("blaze_rod", 2400),
    ("planks", 300),
    ("log", 300),
    ("wooden_slab", 150),
    ("stick", 100),
    ("sapling", 100),
];

const MAX_BURN_TIME: u32 = i32::MAX as u32;

/// Item to burn-time lookup. Items not in the table do not burn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelTable {
    burn_times: BTreeMap<ItemId, u32>,
}

impl Default for FuelTable {
    fn default() -> Self {
        let burn_times = VANILLA_FUELS
            .iter()
            .filter_map(|(path, ticks)| ItemId::parse(path).ok().map(|id| (id, *ticks)))
            .collect();
        Self { burn_times }
    }
}

impl FuelTable {
    /// A table where nothing burns.
    pub fn empty() -> Self {
        Self {
            burn_times: BTreeMap::new(),
        }
    }

    /// Set the burn time of `item`. Zero removes it.
    ///
    /// Burn times are saved as signed 32-bit ints, so larger values are
    /// capped at `i32::MAX`.
    pub fn insert(&mut self, item: ItemId, ticks: u32) {
        if ticks == 0 {
            self.burn_times.remove(&item);
        } else {
            self.burn_times.insert(item, ticks.min(MAX_BURN_TIME));
        }
    }

    /// Builder form of [`Self::insert`].
    pub fn with_fuel(mut self, item: ItemId, ticks: u32) -> Self {
        self.insert(item, ticks);
        self
    }

    /// Burn time of one unit of `stack`; 0 for empty stacks and non-fuels.
    pub fn burn_time(&self, stack: &ItemStack) -> u32 {
        if stack.is_empty() {
            return 0;
        }
        self.burn_times.get(&stack.item).copied().unwrap_or(0)
    }

    /// Whether one unit of `stack` burns at all.
    pub fn is_fuel(&self, stack: &ItemStack) -> bool {
        self.burn_time(stack) > 0
    }

    /// Number of registered fuels.
    pub fn len(&self) -> usize {
        self.burn_times.len()
    }

    /// True when nothing burns.
    pub fn is_empty(&self) -> bool {
        self.burn_times.is_empty()
    }
}
