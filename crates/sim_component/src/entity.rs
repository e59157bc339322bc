//! Entity identity and the per-entity component bag.
//!
//! An [`Entity`] is a lightweight `u64` identifier with no inherent data.
//! All IDs are allocated by the owning world's [`EntityAllocator`] and are
//! never reused within that world's lifetime.
//!
//! The data attached to an entity lives in an [`EntityData`] bag. Bags are
//! handed around as [`SharedEntity`] (`Rc<RefCell<…>>`): a freshly spawned
//! entity can be populated by the caller before it is published, and
//! indexes hold id-keyed handles without owning the canonical record.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::component::ComponentName;

/// A unique entity identifier.
///
/// Entities are pure identifiers — they carry no data of their own. The
/// component bag attached to an entity gives it meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u64);

impl Entity {
    /// The null / invalid entity sentinel.
    pub const INVALID: Entity = Entity(0);

    /// Create an entity from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) entity.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity IDs.
///
/// Lives inside the world and is the single source of truth for entity
/// identity. IDs are assigned at spawn time, before publication, and are
/// never recycled.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. IDs start at 1 (0 is reserved for [`Entity::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh entity ID.
    pub fn allocate(&mut self) -> Entity {
        let id = self.next_id;
        self.next_id += 1;
        Entity(id)
    }

    /// Returns the number of entities allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A live entity's component data.
///
/// The bag's shape is decided by the entity type's blueprint at
/// construction time; game logic then reads and rewrites individual
/// component payloads through [`EntityData::component`] and
/// [`EntityData::set_component`].
#[derive(Debug)]
pub struct EntityData {
    id: Entity,
    type_name: &'static str,
    components: HashMap<ComponentName, Value>,
}

impl EntityData {
    /// Create a bag for the given entity with its initial component payloads.
    #[must_use]
    pub fn new(
        id: Entity,
        type_name: &'static str,
        components: HashMap<ComponentName, Value>,
    ) -> Self {
        Self {
            id,
            type_name,
            components,
        }
    }

    /// The entity this bag belongs to.
    #[must_use]
    pub fn id(&self) -> Entity {
        self.id
    }

    /// The name of the entity type this bag was constructed from.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Get a component payload by name.
    #[must_use]
    pub fn component(&self, name: ComponentName) -> Option<&Value> {
        self.components.get(&name)
    }

    /// Get a mutable component payload by name.
    pub fn component_mut(&mut self, name: ComponentName) -> Option<&mut Value> {
        self.components.get_mut(&name)
    }

    /// Replace (or attach) a component payload.
    pub fn set_component(&mut self, name: ComponentName, value: Value) {
        self.components.insert(name, value);
    }

    /// Returns `true` if the bag carries the named component.
    #[must_use]
    pub fn has_component(&self, name: ComponentName) -> bool {
        self.components.contains_key(&name)
    }

    /// Iterate over all component payloads in the bag.
    pub fn components(&self) -> impl Iterator<Item = (ComponentName, &Value)> {
        self.components.iter().map(|(name, value)| (*name, value))
    }
}

/// Shared handle to a live entity.
///
/// The simulation is single-threaded by design, so plain `Rc<RefCell<…>>`
/// is sufficient: the world owns the canonical handle, spawn callers and
/// indexes hold clones.
pub type SharedEntity = Rc<RefCell<EntityData>>;

/// Wrap freshly constructed entity data into a [`SharedEntity`] handle.
#[must_use]
pub fn share(data: EntityData) -> SharedEntity {
    Rc::new(RefCell::new(data))
}
