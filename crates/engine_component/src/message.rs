//! Entity messages — the typed, synchronous request components receive.
//!
//! A [`Message`] is dispatched to one entity or broadcast to all live
//! entities. Each component of the target gets a chance to handle it, in
//! build order, and the per-component [`MessageResult`]s are combined into
//! the caller's answer.

use serde::{Deserialize, Serialize};

use engine_property::{PropertyValue, ValueKind};

/// What a message means.
///
/// The engine fires `PostInit` and `Destroy` itself at the corresponding
/// lifecycle points; everything else is posted by game code, the editor,
/// or scripts. `Custom` leaves room for script-defined messages without
/// central coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Game-level initialisation, typically broadcast after a scene loads.
    Init,
    /// Fired by the world when an entity finishes construction.
    PostInit,
    /// Fired by the world just before an entity is torn down.
    Destroy,
    /// Per-tick update; params carry the delta time.
    Update,
    /// Application-defined message.
    Custom(u32),
}

/// A message with its parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The message type.
    pub kind: MessageKind,
    /// Positional parameters, reusing the property value erasure.
    pub params: Vec<PropertyValue>,
}

impl Message {
    /// Create a message with no parameters.
    #[must_use]
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
        }
    }

    /// Append a parameter.
    #[must_use]
    pub fn param(mut self, value: impl ValueKind) -> Self {
        self.params.push(value.into_value());
        self
    }

    /// Read a positional parameter as a concrete type.
    ///
    /// `None` when the index is out of range or the parameter has a
    /// different type — handlers decide whether that means `Ignored` or
    /// `Error`.
    #[must_use]
    pub fn get_param<T: ValueKind>(&self, index: usize) -> Option<T> {
        self.params.get(index).and_then(T::from_value)
    }
}

/// The outcome of dispatching a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageResult {
    /// At least one component handled the message.
    Ok,
    /// Nobody was interested (or the target does not exist).
    Ignored,
    /// A handler failed; the failure was contained at the dispatch
    /// boundary.
    Error,
}

impl MessageResult {
    /// Combine two results into one.
    ///
    /// `Error` dominates, then `Ok`, then `Ignored` — a broadcast is `Ok`
    /// if anyone handled it and nothing failed.
    #[must_use]
    pub fn combine(self, other: MessageResult) -> MessageResult {
        use MessageResult::{Error, Ignored, Ok};
        match (self, other) {
            (Error, _) | (_, Error) => Error,
            (Ok, _) | (_, Ok) => Ok,
            (Ignored, Ignored) => Ignored,
        }
    }
}
