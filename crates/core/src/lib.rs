#![warn(missing_docs)]
//! Core value types shared across the powerworks workspace.
//!
//! Everything in here is plain data: positions, item stacks, and the tag tree
//! that block entities and items persist themselves into. Nothing in this
//! crate knows about machines or the host scheduler.

pub mod dimension;
pub mod item;
pub mod pos;
pub mod tag;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use dimension::DimensionId;
pub use item::{ItemId, ItemIdError, ItemStack};
pub use pos::{BlockPos, Facing, FacingSet, WorldPos};
pub use tag::{Compound, Tag, TagError};

/// Host simulation tick counter (20 ticks per second).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick of any run.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}
