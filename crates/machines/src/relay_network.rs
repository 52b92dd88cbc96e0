//! Laser relay connections.
//!
//! A [`RelayNetwork`] stores undirected links between relay positions. Two
//! relays belong to the same network when a chain of links joins them.

use crate::config::RelayConfig;
use powerworks_core::{Compound, Tag, WorldPos};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

const CONNECTIONS_KEY: &str = "Connections";
const FIRST_KEY: &str = "First";
const SECOND_KEY: &str = "Second";

/// Anything that can be asked to link two relays.
pub trait ConnectionRegistry {
    /// Link `a` and `b`. Returns false when the link is refused.
    fn add_connection(&mut self, a: WorldPos, b: WorldPos) -> bool;
}

/// An unordered pair of relay positions in one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Connection {
    first: WorldPos,
    second: WorldPos,
}

impl Connection {
    /// Normalized pair; `None` for a self-link or a cross-dimension pair.
    pub fn new(a: WorldPos, b: WorldPos) -> Option<Self> {
        if a == b || !a.same_dimension(&b) {
            return None;
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Some(Self { first, second })
    }

    /// Lower end.
    pub fn first(&self) -> WorldPos {
        self.first
    }

    /// Upper end.
    pub fn second(&self) -> WorldPos {
        self.second
    }

    /// Whether `pos` is either end.
    pub fn touches(&self, pos: &WorldPos) -> bool {
        self.first == *pos || self.second == *pos
    }

    /// The end that is not `pos`.
    pub fn other(&self, pos: &WorldPos) -> Option<WorldPos> {
        if self.first == *pos {
            Some(self.second)
        } else if self.second == *pos {
            Some(self.first)
        } else {
            None
        }
    }

    fn to_compound(self) -> Compound {
        let mut tag = Compound::new();
        tag.put_compound(FIRST_KEY, self.first.to_compound());
        tag.put_compound(SECOND_KEY, self.second.to_compound());
        tag
    }

    fn from_compound(tag: &Compound) -> Option<Self> {
        let first = WorldPos::from_compound(tag.get_compound(FIRST_KEY)?)?;
        let second = WorldPos::from_compound(tag.get_compound(SECOND_KEY)?)?;
        Self::new(first, second)
    }
}

/// Every relay link in a world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayNetwork {
    max_distance: u32,
    connections: BTreeSet<Connection>,
}

impl RelayNetwork {
    /// An empty network using `config`'s distance limit.
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            max_distance: config.max_distance,
            connections: BTreeSet::new(),
        }
    }

    /// Longest allowed link, in blocks.
    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// True when there are no links.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// All links in order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Whether `a` and `b` are linked directly.
    pub fn is_connected(&self, a: WorldPos, b: WorldPos) -> bool {
        Connection::new(a, b).is_some_and(|link| self.connections.contains(&link))
    }

    /// Links with `pos` as an end.
    pub fn connections_of(&self, pos: &WorldPos) -> Vec<Connection> {
        self.connections
            .iter()
            .filter(|link| link.touches(pos))
            .copied()
            .collect()
    }

    /// Every relay reachable from `pos`, including `pos` itself when it has links.
    pub fn network_of(&self, pos: &WorldPos) -> BTreeSet<WorldPos> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();
        if self.connections.iter().any(|link| link.touches(pos)) {
            seen.insert(*pos);
            queue.push_back(*pos);
        }

        while let Some(current) = queue.pop_front() {
            for link in &self.connections {
                if let Some(next) = link.other(&current) {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        seen
    }

    /// Drop every link of a relay that was removed from the world.
    ///
    /// Returns the number of links dropped.
    pub fn remove_relay(&mut self, pos: &WorldPos) -> usize {
        let before = self.connections.len();
        self.connections.retain(|link| !link.touches(pos));
        let removed = before - self.connections.len();
        if removed > 0 {
            debug!(%pos, removed, "relay links dropped");
        }
        removed
    }

    /// Persist every link.
    pub fn to_tag(&self) -> Compound {
        let mut tag = Compound::new();
        let list = self
            .connections
            .iter()
            .map(|link| Tag::Compound(link.to_compound()))
            .collect();
        tag.put_list(CONNECTIONS_KEY, list);
        tag
    }

    /// Restore links written by [`Self::to_tag`]. Malformed entries are skipped.
    pub fn from_tag(config: &RelayConfig, tag: &Compound) -> Self {
        let mut network = Self::new(config);
        network.connections = tag
            .get_list(CONNECTIONS_KEY)
            .iter()
            .filter_map(Tag::as_compound)
            .filter_map(Connection::from_compound)
            .collect();
        network
    }

    fn within_range(&self, link: &Connection) -> bool {
        let max = u64::from(self.max_distance);
        link.first.pos.distance_sq(link.second.pos) <= max * max
    }
}

impl ConnectionRegistry for RelayNetwork {
    fn add_connection(&mut self, a: WorldPos, b: WorldPos) -> bool {
        let Some(link) = Connection::new(a, b) else {
            return false;
        };
        if !self.within_range(&link) {
            debug!(%a, %b, max = self.max_distance, "relay link out of range");
            return false;
        }
        if !self.connections.insert(link) {
            return false;
        }
        debug!(%a, %b, "relay link added");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerworks_core::DimensionId;

    fn at(x: i32) -> WorldPos {
        WorldPos::new(DimensionId::OVERWORLD, x, 64, 0)
    }

    fn network() -> RelayNetwork {
        RelayNetwork::new(&RelayConfig::default())
    }

    #[test]
    fn rejects_self_cross_dimension_and_duplicates() {
        let mut relays = network();
        assert!(!relays.add_connection(at(0), at(0)));
        assert!(!relays.add_connection(at(0), WorldPos::new(DimensionId::NETHER, 1, 64, 0)));
        assert!(relays.add_connection(at(0), at(3)));
        assert!(!relays.add_connection(at(3), at(0)));
        assert_eq!(relays.len(), 1);
    }

    #[test]
    fn range_is_inclusive() {
        let mut relays = network();
        assert!(relays.add_connection(at(0), at(15)));
        assert!(!relays.add_connection(at(0), at(16)));
        assert!(!relays.add_connection(at(0), WorldPos::new(DimensionId::OVERWORLD, 11, 64, 11)));
    }

    #[test]
    fn networks_merge_and_split() {
        let mut relays = network();
        relays.add_connection(at(0), at(5));
        relays.add_connection(at(10), at(15));
        assert_eq!(relays.network_of(&at(0)).len(), 2);

        relays.add_connection(at(5), at(10));
        assert_eq!(relays.network_of(&at(0)).len(), 4);
        assert_eq!(relays.connections_of(&at(5)).len(), 2);

        assert_eq!(relays.remove_relay(&at(5)), 2);
        assert!(relays.network_of(&at(0)).is_empty());
        assert_eq!(relays.network_of(&at(15)), [at(10), at(15)].into_iter().collect());
    }

    #[test]
    fn tag_round_trip_skips_garbage() {
        let mut relays = network();
        relays.add_connection(at(0), at(5));
        relays.add_connection(at(5), at(9));

        let mut tag = relays.to_tag();
        if let Some(Tag::List(list)) = tag.remove(CONNECTIONS_KEY) {
            let mut list = list;
            list.push(Tag::Int(1));
            list.push(Tag::Compound(Compound::new()));
            tag.put_list(CONNECTIONS_KEY, list);
        }

        let restored = RelayNetwork::from_tag(&RelayConfig::default(), &tag);
        assert_eq!(restored, relays);
    }
}
