//! Entity handle type.
//!
//! An [`EntityHandle`] is a lightweight `{index, generation}` pair with no
//! inherent data. It is the only way the rest of the engine refers to an
//! entity — raw references to entity storage are never handed out.

use serde::{Deserialize, Serialize};

/// A reference token for an entity.
///
/// Handles are weak by construction: holding one says nothing about whether
/// the entity is still alive. Liveness is answered by the registry
/// ([`crate::HandleRegistry::contains`]), which compares the handle's
/// generation against the slot's current generation.
///
/// Handles order and hash by their packed [`id`](EntityHandle::id) alone, so
/// they work as map keys without touching the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// The null handle sentinel. Never resolves to an entity.
    pub const NULL: EntityHandle = EntityHandle {
        index: u32::MAX,
        generation: 0,
    };

    /// Create a handle from raw parts. Used by the registry and by
    /// deserialization; ordinary code receives handles from the registry.
    #[must_use]
    pub const fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The slot index this handle points at.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// The generation the slot had when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// The packed stable identifier: `generation << 32 | index`.
    ///
    /// Unique for the lifetime of the process — a slot reuse bumps the
    /// generation, so no two entities ever share an id.
    #[must_use]
    pub const fn id(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Rebuild a handle from a packed [`id`](EntityHandle::id).
    #[must_use]
    pub const fn from_id(id: u64) -> Self {
        Self {
            index: (id & 0xffff_ffff) as u32,
            generation: (id >> 32) as u32,
        }
    }

    /// Returns `true` if this is not the null sentinel.
    ///
    /// A valid handle may still be stale; see
    /// [`crate::HandleRegistry::contains`] for liveness.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.index != u32::MAX
    }
}

impl Default for EntityHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl PartialOrd for EntityHandle {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityHandle {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id().cmp(&other.id())
    }
}

impl std::fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "Entity({}:{})", self.index, self.generation)
        } else {
            write!(f, "Entity(null)")
        }
    }
}
