//! Core [`Component`] trait and type identity.
//!
//! Every unit of data/behaviour attached to an entity implements
//! [`Component`]. Components are owned by exactly one entity, are built
//! and torn down by the world in dependency order, and communicate with
//! siblings only through messages and the property layer — never through
//! direct references.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::context::MessageContext;
use crate::message::{Message, MessageResult};

/// A unique identifier for a component type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
///
/// The ID is deterministic: registration, saved records, and scripting all
/// agree on it because they all hash the same UTF-8 name bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's string name.
    ///
    /// This is the canonical derivation — everything that needs a type id
    /// (registration, descriptions, saved records) goes through it.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// The core component trait.
///
/// Lifecycle, as driven by the world:
///
/// 1. `init` — after construction, while the owning entity is still
///    unfinished. Dependencies have already been constructed and
///    initialised.
/// 2. `handle_message` — for every message dispatched to the owner,
///    including the engine-fired `PostInit` (when the entity finishes
///    construction) and `Destroy` (when the destroy queue drains).
/// 3. `clean` — just before destruction, in reverse dependency order.
///
/// Handlers run synchronously to completion. They reach sibling state
/// exclusively through the [`MessageContext`] — reading and writing
/// properties by key, or posting further messages — so components can be
/// added, removed, or replaced at runtime without dangling references.
pub trait Component: Any {
    /// Called once after the component is constructed and attached.
    fn init(&mut self) {}

    /// Called once just before the component is destroyed.
    fn clean(&mut self) {}

    /// Handle a message dispatched to the owning entity.
    ///
    /// The default implementation ignores everything.
    fn handle_message(&mut self, ctx: &MessageContext<'_>, message: &Message) -> MessageResult {
        let _ = (ctx, message);
        MessageResult::Ignored
    }
}

impl dyn Component {
    /// Downcast a shared component reference to its concrete type.
    #[must_use]
    pub fn downcast_ref<C: Component>(&self) -> Option<&C> {
        (self as &dyn Any).downcast_ref::<C>()
    }

    /// Downcast an exclusive component reference to its concrete type.
    #[must_use]
    pub fn downcast_mut<C: Component>(&mut self) -> Option<&mut C> {
        (self as &mut dyn Any).downcast_mut::<C>()
    }
}
