//! Laser wrench: links two laser relays.
//!
//! The item itself is stateless. The first relay clicked is remembered on the
//! stack's own tag; clicking a second relay asks a [`ConnectionRegistry`] to
//! link the two and clears the memory on success.

use crate::relay_network::ConnectionRegistry;
use crate::world::{MessageSink, WorldAccess};
use powerworks_core::item::MOD_NAMESPACE;
use powerworks_core::{DimensionId, ItemId, ItemStack, WorldPos};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const X_KEY: &str = "XCoordOfTileStored";
const Y_KEY: &str = "YCoordOfTileStored";
const Z_KEY: &str = "ZCoordOfTileStored";
const WORLD_KEY: &str = "WorldOfTileStored";
const STORED_KEYS: [&str; 4] = [X_KEY, Y_KEY, Z_KEY, WORLD_KEY];

/// Registry path of the item.
pub const ITEM_PATH: &str = "laser_wrench";

/// Result of using the wrench, reported to the acting player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkOutcome {
    /// First relay remembered.
    Stored,
    /// Both relays linked.
    Connected,
    /// The registry refused the link.
    Failed,
    /// The remembered relay is gone.
    TargetGone,
}

impl LinkOutcome {
    /// Chat text for the outcome.
    pub fn message(&self) -> &'static str {
        match self {
            LinkOutcome::Stored => "Stored!",
            LinkOutcome::Connected => "Connected!",
            LinkOutcome::Failed => "Couldn't connect!",
            LinkOutcome::TargetGone => {
                "The Laser Relay you were trying to connect to doesn't exist anymore!"
            }
        }
    }
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Behaviour of the laser wrench item.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaserWrench;

impl LaserWrench {
    /// Item id of the wrench.
    pub fn item_id() -> ItemId {
        ItemId::parse(&format!("{MOD_NAMESPACE}:{ITEM_PATH}")).unwrap_or_else(|_| ItemId::air())
    }

    /// A single wrench with nothing stored.
    pub fn new_stack() -> ItemStack {
        ItemStack::new(Self::item_id(), 1)
    }

    /// The relay remembered on `stack`, if all four keys are present.
    pub fn stored_position(stack: &ItemStack) -> Option<WorldPos> {
        let tag = stack.tag.as_ref()?;
        if !STORED_KEYS.iter().all(|key| tag.contains_key(key)) {
            return None;
        }
        Some(WorldPos::new(
            DimensionId(tag.get_int(WORLD_KEY)),
            tag.get_int(X_KEY),
            tag.get_int(Y_KEY),
            tag.get_int(Z_KEY),
        ))
    }

    /// Remember `pos` on `stack`.
    pub fn store_position(stack: &mut ItemStack, pos: WorldPos) {
        let tag = stack.tag_mut();
        tag.put_int(X_KEY, pos.pos.x);
        tag.put_int(Y_KEY, pos.pos.y);
        tag.put_int(Z_KEY, pos.pos.z);
        tag.put_int(WORLD_KEY, pos.dimension.id());
    }

    /// Forget the remembered relay. Other tag data on the stack is kept.
    pub fn clear_storage(stack: &mut ItemStack) {
        let Some(tag) = stack.tag.as_mut() else {
            return;
        };
        for key in STORED_KEYS {
            tag.remove(key);
        }
        if tag.is_empty() {
            stack.tag = None;
        }
    }

    /// Use the wrench on the block at `target`.
    ///
    /// Returns whether the interaction was consumed, which is the case for
    /// every link-capable target even when nothing changes.
    pub fn use_on_block(
        stack: &mut ItemStack,
        actor: &mut dyn MessageSink,
        world: &dyn WorldAccess,
        registry: &mut dyn ConnectionRegistry,
        target: WorldPos,
    ) -> bool {
        if !world.is_link_capable(&target) {
            return false;
        }

        let Some(stored) = Self::stored_position(stack) else {
            Self::store_position(stack, target);
            debug!(%target, "wrench stored relay");
            actor.send_message(&LinkOutcome::Stored);
            return true;
        };

        if !world.is_link_capable(&stored) {
            Self::clear_storage(stack);
            debug!(%stored, "wrench target gone");
            actor.send_message(&LinkOutcome::TargetGone);
            return true;
        }

        if stored == target || !stored.same_dimension(&target) {
            return true;
        }

        if registry.add_connection(stored, target) {
            Self::clear_storage(stack);
            debug!(%stored, %target, "wrench connected relays");
            actor.send_message(&LinkOutcome::Connected);
        } else {
            debug!(%stored, %target, "wrench link refused");
            actor.send_message(&LinkOutcome::Failed);
        }
        true
    }

    /// Per-tick upkeep while the stack sits in an inventory.
    ///
    /// A remembered relay that no longer exists is forgotten silently. Stacks
    /// that are not wrenches are left alone.
    pub fn inventory_tick(stack: &mut ItemStack, world: &dyn WorldAccess) {
        if !Self::is_wrench(stack) {
            return;
        }
        if let Some(stored) = Self::stored_position(stack) {
            if !world.is_link_capable(&stored) {
                Self::clear_storage(stack);
            }
        }
    }

    /// Whether `stack` is a wrench.
    pub fn is_wrench(stack: &ItemStack) -> bool {
        !stack.is_empty() && stack.item == Self::item_id()
    }
}
