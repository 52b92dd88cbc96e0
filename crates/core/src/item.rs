//! Item identifiers and item stacks.
//!
//! An [`ItemStack`] is the value held by one inventory slot. The empty stack is
//! a real value ([`ItemStack::empty`]), never `None`, so slot arrays are plain
//! `Vec<ItemStack>` and every slot always holds something.

use crate::tag::Compound;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Namespace used when an id omits one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Namespace of the items this workspace adds.
pub const MOD_NAMESPACE: &str = "powerworks";

/// Item-level stack limit for ordinary items.
pub const DEFAULT_MAX_STACK_SIZE: u32 = 64;

/// Error returned when parsing an invalid [`ItemId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemIdError {
    /// Nothing but whitespace was given.
    #[error("item id is empty")]
    Empty,
    /// More than one `:` separator.
    #[error("item id `{0}` has more than one namespace separator")]
    TooManySeparators(String),
    /// Namespace or path contains a character outside the allowed set.
    #[error("item id `{id}` contains invalid character {ch:?}")]
    InvalidCharacter {
        /// The offending id.
        id: String,
        /// The first invalid character.
        ch: char,
    },
}

/// Namespaced item identifier of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)`. Serialized as the plain
/// `namespace:path` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId {
    namespace: String,
    path: String,
}

impl ItemId {
    /// Parse `namespace:path`, or `path` in the [`DEFAULT_NAMESPACE`].
    pub fn parse(input: &str) -> Result<Self, ItemIdError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ItemIdError::Empty);
        }

        let (namespace, path) = match input.split_once(':') {
            Some((namespace, path)) => {
                if path.contains(':') {
                    return Err(ItemIdError::TooManySeparators(input.to_string()));
                }
                (namespace, path)
            }
            None => (DEFAULT_NAMESPACE, input),
        };

        if namespace.is_empty() || path.is_empty() {
            return Err(ItemIdError::Empty);
        }

        let valid_namespace = |c: char| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.');
        let valid_path = |c: char| valid_namespace(c) || c == '/';

        if let Some(ch) = namespace.chars().find(|c| !valid_namespace(*c)) {
            return Err(ItemIdError::InvalidCharacter {
                id: input.to_string(),
                ch,
            });
        }
        if let Some(ch) = path.chars().find(|c| !valid_path(*c)) {
            return Err(ItemIdError::InvalidCharacter {
                id: input.to_string(),
                ch,
            });
        }

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// The "no item" id, `minecraft:air`.
    pub fn air() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            path: "air".to_string(),
        }
    }

    /// True for `minecraft:air`.
    pub fn is_air(&self) -> bool {
        self.namespace == DEFAULT_NAMESPACE && self.path == "air"
    }

    /// Namespace part.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Path part.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Item-level stack limit.
    ///
    /// Tools, filled buckets and this workspace's laser wrench do not stack;
    /// a handful of vanilla items stop at 16.
    pub fn max_stack_size(&self) -> u32 {
        const SINGLE: &[&str] = &[
            "lava_bucket",
            "water_bucket",
            "milk_bucket",
            "saddle",
            "bow",
            "shears",
            "flint_and_steel",
        ];
        const SIXTEEN: &[&str] = &["ender_pearl", "snowball", "egg", "bucket", "sign"];
        const TOOL_SUFFIXES: &[&str] = &["_pickaxe", "_axe", "_shovel", "_sword", "_hoe"];

        match self.namespace.as_str() {
            MOD_NAMESPACE if self.path == "laser_wrench" => 1,
            DEFAULT_NAMESPACE => {
                let path = self.path.as_str();
                if SINGLE.contains(&path) || TOOL_SUFFIXES.iter().any(|s| path.ends_with(s)) {
                    1
                } else if SIXTEEN.contains(&path) {
                    16
                } else {
                    DEFAULT_MAX_STACK_SIZE
                }
            }
            _ => DEFAULT_MAX_STACK_SIZE,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ItemId {
    type Err = ItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = ItemIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

/// The contents of one inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// What kind of item this is.
    pub item: ItemId,
    /// How many (0 means empty).
    pub count: u32,
    /// Auxiliary per-stack data (the laser wrench keeps its target here).
    pub tag: Option<Compound>,
}

impl Default for ItemStack {
    fn default() -> Self {
        Self::empty()
    }
}

impl ItemStack {
    /// The canonical empty stack.
    pub fn empty() -> Self {
        Self {
            item: ItemId::air(),
            count: 0,
            tag: None,
        }
    }

    /// Create a stack without auxiliary data; a zero count or air yields the empty stack.
    pub fn new(item: ItemId, count: u32) -> Self {
        if count == 0 || item.is_air() {
            return Self::empty();
        }
        Self {
            item,
            count,
            tag: None,
        }
    }

    /// Attach auxiliary data.
    pub fn with_tag(mut self, tag: Compound) -> Self {
        if !self.is_empty() {
            self.tag = Some(tag);
        }
        self
    }

    /// True for the empty stack (zero count or air).
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item.is_air()
    }

    /// Item-level stack limit.
    pub fn max_stack_size(&self) -> u32 {
        self.item.max_stack_size()
    }

    /// True when both stacks hold the same item with the same auxiliary data.
    pub fn stacks_with(&self, other: &ItemStack) -> bool {
        self.item == other.item && self.tag == other.tag
    }

    /// A copy of this stack with a different count (0 yields the empty stack).
    pub fn copy_with_count(&self, count: u32) -> Self {
        if count == 0 || self.is_empty() {
            return Self::empty();
        }
        Self {
            item: self.item.clone(),
            count,
            tag: self.tag.clone(),
        }
    }

    /// Add to the count.
    pub fn grow(&mut self, amount: u32) {
        if !self.is_empty() {
            self.count = self.count.saturating_add(amount);
        }
    }

    /// Remove from the count; a stack that reaches zero becomes the canonical empty stack.
    pub fn shrink(&mut self, amount: u32) {
        self.count = self.count.saturating_sub(amount);
        if self.count == 0 {
            *self = Self::empty();
        }
    }

    /// Split off up to `amount` items into a new stack.
    pub fn split(&mut self, amount: u32) -> ItemStack {
        let taken = amount.min(self.count);
        let split = self.copy_with_count(taken);
        self.shrink(taken);
        split
    }

    /// Auxiliary data, created on first access.
    pub fn tag_mut(&mut self) -> &mut Compound {
        self.tag.get_or_insert_with(Compound::new)
    }

    /// Write this stack as `id`, `Count` and optional `tag` keys.
    ///
    /// The empty stack writes an empty compound.
    pub fn write_to(&self) -> Compound {
        let mut out = Compound::new();
        if self.is_empty() {
            return out;
        }
        out.put_string("id", self.item.to_string());
        match i8::try_from(self.count) {
            Ok(count) => out.put_byte("Count", count),
            Err(_) => out.put_int("Count", i32::try_from(self.count).unwrap_or(i32::MAX)),
        }
        if let Some(tag) = &self.tag {
            out.put_compound("tag", tag.clone());
        }
        out
    }

    /// Read a stack written by [`ItemStack::write_to`].
    ///
    /// A missing or unparsable id, or a non-positive count, reads as the empty stack.
    pub fn read_from(tag: &Compound) -> ItemStack {
        let Ok(item) = ItemId::parse(tag.get_string("id")) else {
            return ItemStack::empty();
        };
        let count = tag.get_u32("Count");
        let stack = ItemStack::new(item, count);
        match tag.get_compound("tag") {
            Some(aux) => stack.with_tag(aux.clone()),
            None => stack,
        }
    }
}
