//! Dimension identifiers.
//!
//! Block positions are only meaningful inside one dimension (world partition).
//! Hosts number their dimensions with signed integers and mods may register
//! more, so this is an open newtype rather than a closed enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a world dimension.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DimensionId(pub i32);

impl DimensionId {
    /// The Overworld.
    pub const OVERWORLD: Self = Self(0);
    /// The Nether.
    pub const NETHER: Self = Self(-1);
    /// The End.
    pub const END: Self = Self(1);

    /// Raw numeric id, as stored in tags.
    pub const fn id(self) -> i32 {
        self.0
    }

    /// Canonical name for the vanilla dimensions.
    pub const fn vanilla_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("overworld"),
            -1 => Some("nether"),
            1 => Some("end"),
            _ => None,
        }
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vanilla_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "dim{}", self.0),
        }
    }
}
