//! Block coordinates, dimension-qualified positions, and block faces.

use crate::dimension::DimensionId;
use crate::tag::Compound;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer block coordinates inside one dimension.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    /// East/west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North/south coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Create a new block position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The neighbouring position across `facing`.
    pub fn offset(self, facing: Facing) -> Self {
        let (dx, dy, dz) = facing.offset();
        Self::new(
            self.x.wrapping_add(dx),
            self.y.wrapping_add(dy),
            self.z.wrapping_add(dz),
        )
    }

    /// Squared Euclidean distance, widened so far-apart positions cannot overflow.
    pub fn distance_sq(self, other: Self) -> u64 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).unsigned_abs();
        let dz = (i64::from(self.z) - i64::from(other.z)).unsigned_abs();
        dx.saturating_mul(dx)
            .saturating_add(dy.saturating_mul(dy))
            .saturating_add(dz.saturating_mul(dz))
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A block position qualified by its dimension.
///
/// This is the lookup key block entities and items keep instead of a live
/// reference to the world; it is resolved through a world-access collaborator
/// at the time of use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct WorldPos {
    /// Dimension the block lives in.
    pub dimension: DimensionId,
    /// Coordinates inside that dimension.
    pub pos: BlockPos,
}

impl WorldPos {
    /// Create a new dimension-qualified position.
    pub const fn new(dimension: DimensionId, x: i32, y: i32, z: i32) -> Self {
        Self {
            dimension,
            pos: BlockPos::new(x, y, z),
        }
    }

    /// The neighbouring position across `facing`, in the same dimension.
    pub fn offset(self, facing: Facing) -> Self {
        Self {
            dimension: self.dimension,
            pos: self.pos.offset(facing),
        }
    }

    /// True when both positions are in the same dimension.
    pub fn same_dimension(&self, other: &WorldPos) -> bool {
        self.dimension == other.dimension
    }

    /// Write this position as `Dim`/`X`/`Y`/`Z` integer keys.
    pub fn to_compound(&self) -> Compound {
        let mut tag = Compound::new();
        tag.put_int("Dim", self.dimension.id());
        tag.put_int("X", self.pos.x);
        tag.put_int("Y", self.pos.y);
        tag.put_int("Z", self.pos.z);
        tag
    }

    /// Read a position written by [`WorldPos::to_compound`].
    ///
    /// Returns `None` unless all four keys are present.
    pub fn from_compound(tag: &Compound) -> Option<Self> {
        if !["Dim", "X", "Y", "Z"].iter().all(|key| tag.contains_key(key)) {
            return None;
        }
        Some(Self::new(
            DimensionId(tag.get_int("Dim")),
            tag.get_int("X"),
            tag.get_int("Y"),
            tag.get_int("Z"),
        ))
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.pos, self.dimension)
    }
}

/// One of the six faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Facing {
    /// -Y
    Down,
    /// +Y
    Up,
    /// -Z
    North,
    /// +Z
    South,
    /// -X
    West,
    /// +X
    East,
}

impl Facing {
    /// All faces in index order.
    pub const ALL: [Facing; 6] = [
        Facing::Down,
        Facing::Up,
        Facing::North,
        Facing::South,
        Facing::West,
        Facing::East,
    ];

    /// Unit offset `(dx, dy, dz)` towards this face.
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Facing::Down => (0, -1, 0),
            Facing::Up => (0, 1, 0),
            Facing::North => (0, 0, -1),
            Facing::South => (0, 0, 1),
            Facing::West => (-1, 0, 0),
            Facing::East => (1, 0, 0),
        }
    }
}

bitflags::bitflags! {
    /// A set of block faces.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FacingSet: u8 {
        /// -Y
        const DOWN = 0b0000_0001;
        /// +Y
        const UP = 0b0000_0010;
        /// -Z
        const NORTH = 0b0000_0100;
        /// +Z
        const SOUTH = 0b0000_1000;
        /// -X
        const WEST = 0b0001_0000;
        /// +X
        const EAST = 0b0010_0000;
    }
}

impl Default for FacingSet {
    fn default() -> Self {
        FacingSet::empty()
    }
}

impl From<Facing> for FacingSet {
    fn from(facing: Facing) -> Self {
        match facing {
            Facing::Down => FacingSet::DOWN,
            Facing::Up => FacingSet::UP,
            Facing::North => FacingSet::NORTH,
            Facing::South => FacingSet::SOUTH,
            Facing::West => FacingSet::WEST,
            Facing::East => FacingSet::EAST,
        }
    }
}

impl FacingSet {
    /// Iterate the contained faces in [`Facing::ALL`] order.
    pub fn faces(self) -> impl Iterator<Item = Facing> {
        Facing::ALL
            .into_iter()
            .filter(move |facing| self.contains(FacingSet::from(*facing)))
    }

    /// Number of faces in the set.
    pub fn count(self) -> u32 {
        self.bits().count_ones()
    }
}
