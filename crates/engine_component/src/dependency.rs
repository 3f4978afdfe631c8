//! Dependency-ordered construction.
//!
//! A component type may declare that it requires other component types on
//! the same entity. [`resolve_build_order`] turns a requested component
//! set into the order the world builds (and, reversed, tears down)
//! instances: every dependency completes before any dependent.
//!
//! The order is a *stable* topological sort — a documented contract, not
//! an accident of iteration order. Kahn's algorithm drains its ready set
//! in request-declaration order, so for the diamond `A needs B and C; B
//! needs C`, requesting `[A, B, C]` always builds `[C, B, A]`.

use crate::component::ComponentTypeId;
use crate::spec::ComponentRegistry;

/// Errors raised while resolving a requested component set.
///
/// All of these fail the single entity-creation call that raised them and
/// nothing else; they are detected before any component is constructed.
#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    /// The same component type was requested twice.
    #[error("duplicate component type '{0}' in entity description")]
    Duplicate(String),

    /// A requested component type is not registered.
    #[error("unknown component type {0}")]
    Unknown(ComponentTypeId),

    /// A declared dependency is not part of the requested set.
    #[error("component '{component}' requires '{requires}', which the entity does not have")]
    Unsatisfied { component: String, requires: String },

    /// The declared dependencies contain a cycle.
    #[error("cyclic dependency among components: {0}")]
    Cycle(String),
}

/// Resolve the build order for a requested component set.
///
/// Validates the request (duplicates, unknown types, unsatisfiable
/// dependencies) and returns the component type ids in an order where
/// every declared dependency precedes its dependents. Independent
/// components keep their relative request order.
pub fn resolve_build_order(
    registry: &ComponentRegistry,
    requested: &[ComponentTypeId],
) -> Result<Vec<ComponentTypeId>, DependencyError> {
    // Validate: no duplicates, everything registered, every declared
    // dependency part of the request.
    let mut specs = Vec::with_capacity(requested.len());
    for (i, &type_id) in requested.iter().enumerate() {
        if requested[..i].contains(&type_id) {
            return Err(DependencyError::Duplicate(registry.name_of(type_id)));
        }
        let spec = registry
            .get(type_id)
            .ok_or(DependencyError::Unknown(type_id))?;
        specs.push((type_id, spec));
    }
    for &(type_id, spec) in &specs {
        for &dep in spec.dependencies() {
            if !requested.contains(&dep) {
                return Err(DependencyError::Unsatisfied {
                    component: registry.name_of(type_id),
                    requires: registry.name_of(dep),
                });
            }
        }
    }

    // Kahn's algorithm over the in-request dependency edges. The ready
    // scan always walks the request left to right, which is what makes
    // the resulting order stable.
    let mut remaining = specs;
    let mut order = Vec::with_capacity(requested.len());

    while !remaining.is_empty() {
        let ready = remaining.iter().position(|(_, spec)| {
            spec.dependencies()
                .iter()
                .all(|dep| !remaining.iter().any(|(id, _)| id == dep))
        });

        match ready {
            Some(index) => order.push(remaining.remove(index).0),
            None => {
                let names: Vec<String> = remaining
                    .iter()
                    .map(|&(id, _)| registry.name_of(id))
                    .collect();
                return Err(DependencyError::Cycle(names.join(", ")));
            }
        }
    }

    Ok(order)
}
