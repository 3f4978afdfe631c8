//! Property access flags and caller contexts.
//!
//! Every registered property declares a [`PropertyAccess`] bitmask; every
//! generic read or write arrives with an [`AccessContext`] naming who is
//! asking. The pairing decides whether the operation proceeds. A refused
//! operation is a no-op for the caller — tooling and scripts can never
//! corrupt engine state, and can never crash it either.

use serde::{Deserialize, Serialize};

/// Permission bitmask declared per property.
///
/// Combine flags with `|`:
///
/// ```rust
/// use engine_property::PropertyAccess;
///
/// let access = PropertyAccess::EDIT_READ | PropertyAccess::EDIT_WRITE;
/// assert!(access.contains(PropertyAccess::EDIT_READ));
/// assert!(!access.contains(PropertyAccess::SCRIPT_WRITE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAccess(u8);

impl PropertyAccess {
    /// No generic access at all (engine-internal only).
    pub const NONE: PropertyAccess = PropertyAccess(0);
    /// Settable during the construction/deserialisation window only.
    pub const INIT: PropertyAccess = PropertyAccess(1 << 0);
    /// Readable by the editor.
    pub const EDIT_READ: PropertyAccess = PropertyAccess(1 << 1);
    /// Writable by the editor.
    pub const EDIT_WRITE: PropertyAccess = PropertyAccess(1 << 2);
    /// Readable by scripts.
    pub const SCRIPT_READ: PropertyAccess = PropertyAccess(1 << 3);
    /// Writable by scripts.
    pub const SCRIPT_WRITE: PropertyAccess = PropertyAccess(1 << 4);
    /// Never serialised.
    pub const TRANSIENT: PropertyAccess = PropertyAccess(1 << 5);

    /// Read and write for both editor and scripts.
    pub const FULL: PropertyAccess = PropertyAccess(
        Self::EDIT_READ.0 | Self::EDIT_WRITE.0 | Self::SCRIPT_READ.0 | Self::SCRIPT_WRITE.0,
    );

    /// Combine two flag sets. Const-friendly form of `|` for static
    /// tables.
    #[must_use]
    pub const fn union(self, other: PropertyAccess) -> PropertyAccess {
        PropertyAccess(self.0 | other.0)
    }

    /// Returns `true` if all flags in `other` are set in `self`.
    #[must_use]
    pub const fn contains(self, other: PropertyAccess) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns `true` if any flag in `other` is set in `self`.
    #[must_use]
    pub const fn intersects(self, other: PropertyAccess) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for PropertyAccess {
    type Output = PropertyAccess;

    fn bitor(self, rhs: PropertyAccess) -> PropertyAccess {
        PropertyAccess(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for PropertyAccess {
    fn bitor_assign(&mut self, rhs: PropertyAccess) {
        self.0 |= rhs.0;
    }
}

/// Who is performing a generic property access.
///
/// The engine itself bypasses the flag check — internal propagation (e.g.
/// prototype updates) must always succeed. `Init` is only honoured while
/// the owning entity is still under construction; the world enforces that
/// part, since only it knows the entity's finished flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessContext {
    /// Engine-internal access; unrestricted.
    Engine,
    /// The construction/deserialisation window.
    Init,
    /// Generic editor widgets.
    Editor,
    /// The scripting host.
    Script,
}

impl AccessContext {
    /// May this caller read a property with the given flags?
    #[must_use]
    pub fn can_read(self, access: PropertyAccess) -> bool {
        match self {
            AccessContext::Engine | AccessContext::Init => true,
            AccessContext::Editor => access.contains(PropertyAccess::EDIT_READ),
            AccessContext::Script => access.contains(PropertyAccess::SCRIPT_READ),
        }
    }

    /// May this caller write a property with the given flags?
    #[must_use]
    pub fn can_write(self, access: PropertyAccess) -> bool {
        match self {
            AccessContext::Engine => true,
            AccessContext::Init => access.contains(PropertyAccess::INIT),
            AccessContext::Editor => access.contains(PropertyAccess::EDIT_WRITE),
            AccessContext::Script => access.contains(PropertyAccess::SCRIPT_WRITE),
        }
    }
}

impl std::fmt::Display for AccessContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AccessContext::Engine => "engine",
            AccessContext::Init => "init",
            AccessContext::Editor => "editor",
            AccessContext::Script => "script",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_and_union() {
        let access = PropertyAccess::INIT | PropertyAccess::EDIT_READ;
        assert!(access.contains(PropertyAccess::INIT));
        assert!(access.contains(PropertyAccess::EDIT_READ));
        assert!(!access.contains(PropertyAccess::EDIT_WRITE));
        assert!(!access.contains(PropertyAccess::INIT | PropertyAccess::EDIT_WRITE));
    }

    #[test]
    fn test_full_covers_edit_and_script() {
        assert!(PropertyAccess::FULL.contains(PropertyAccess::EDIT_READ));
        assert!(PropertyAccess::FULL.contains(PropertyAccess::SCRIPT_WRITE));
        assert!(!PropertyAccess::FULL.contains(PropertyAccess::TRANSIENT));
        assert!(!PropertyAccess::FULL.contains(PropertyAccess::INIT));
    }

    #[test]
    fn test_engine_bypasses_flags() {
        assert!(AccessContext::Engine.can_read(PropertyAccess::NONE));
        assert!(AccessContext::Engine.can_write(PropertyAccess::NONE));
    }

    #[test]
    fn test_editor_write_requires_flag() {
        let read_only = PropertyAccess::EDIT_READ;
        assert!(AccessContext::Editor.can_read(read_only));
        assert!(!AccessContext::Editor.can_write(read_only));
        assert!(AccessContext::Editor.can_write(read_only | PropertyAccess::EDIT_WRITE));
    }

    #[test]
    fn test_script_flags_independent_of_edit_flags() {
        let edit_only = PropertyAccess::EDIT_READ | PropertyAccess::EDIT_WRITE;
        assert!(!AccessContext::Script.can_read(edit_only));
        assert!(!AccessContext::Script.can_write(edit_only));
    }

    #[test]
    fn test_init_write_requires_init_flag() {
        assert!(AccessContext::Init.can_write(PropertyAccess::INIT));
        assert!(!AccessContext::Init.can_write(PropertyAccess::FULL));
    }
}
