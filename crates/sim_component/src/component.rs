//! Component names and component-set requirements.
//!
//! Components are declared by name, not by Rust type: the game's entity
//! roster is data-driven, so component payloads are stored as
//! `serde_json::Value` and identified by a [`ComponentName`]. Capability
//! matching between entity types and indexes is a plain subset test over
//! [`ComponentSet`]s, resolved once when the world is locked.

use std::collections::BTreeSet;

/// The name of a component facet (e.g. `"tile_position"`, `"health"`).
///
/// Component names are `&'static str` under the hood: the roster of
/// component kinds is fixed at compile time even though the data each
/// carries is dynamic. The newtype is `Copy` and ordered so component
/// sets iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentName(&'static str);

impl ComponentName {
    /// Create a component name from a static string.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the underlying string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ComponentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// An ordered set of component names.
///
/// Used both as an entity type's declared components and as an index's
/// capability requirement. An index with requirement `R` observes every
/// entity type whose declared set `C` satisfies `R ⊆ C`.
pub type ComponentSet = BTreeSet<ComponentName>;

/// Build a [`ComponentSet`] from a list of names.
#[must_use]
pub fn component_set(names: &[ComponentName]) -> ComponentSet {
    names.iter().copied().collect()
}
