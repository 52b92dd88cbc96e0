//! Host-world touch points used by items.

use crate::laser_wrench::LinkOutcome;
use powerworks_core::WorldPos;
use std::collections::BTreeSet;

/// Read-only queries against the host world.
pub trait WorldAccess {
    /// Whether the block at `pos` exists and is a laser relay.
    fn is_link_capable(&self, pos: &WorldPos) -> bool;
}

/// A world described only by the positions of its relays.
impl WorldAccess for BTreeSet<WorldPos> {
    fn is_link_capable(&self, pos: &WorldPos) -> bool {
        self.contains(pos)
    }
}

/// Where user-facing results go, usually the acting player.
pub trait MessageSink {
    /// Deliver one outcome.
    fn send_message(&mut self, outcome: &LinkOutcome);
}

impl MessageSink for Vec<LinkOutcome> {
    fn send_message(&mut self, outcome: &LinkOutcome) {
        self.push(*outcome);
    }
}
