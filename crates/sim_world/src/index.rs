//! [`SimpleListIndex`] — the reference [`Index`] implementation.
//!
//! Maintains an id→handle map over every published entity matching a fixed
//! component requirement. Concrete indexes (chunked spatial index,
//! tile-occupancy index, render list) follow this pattern: insert on add,
//! delete on remove, own nothing but a supplementary lookup structure.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use sim_component::{ComponentSet, Entity, SharedEntity};

use crate::error::WorldError;
use crate::observer::Index;
use crate::world::World;

/// An id-keyed list of all published entities matching a component set.
///
/// Iteration is snapshot-free: iterating while the world is mid-drain is
/// undefined unless the caller copies first via [`snapshot`](Self::snapshot).
pub struct SimpleListIndex {
    components: ComponentSet,
    entities: HashMap<Entity, SharedEntity>,
}

impl SimpleListIndex {
    /// Create an index requiring the given components.
    #[must_use]
    pub fn new(components: ComponentSet) -> Self {
        Self {
            components,
            entities: HashMap::new(),
        }
    }

    /// Build and register in one step, returning the shared handle used
    /// for querying.
    pub fn register(
        world: &mut World,
        components: ComponentSet,
    ) -> Result<Rc<RefCell<Self>>, WorldError> {
        world.register_index(Self::new(components))
    }

    /// Look up a held entity by id.
    #[must_use]
    pub fn get(&self, id: Entity) -> Option<SharedEntity> {
        self.entities.get(&id).cloned()
    }

    /// The number of entities currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no matching entity is published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over the currently-held entities.
    pub fn iter(&self) -> impl Iterator<Item = &SharedEntity> {
        self.entities.values()
    }

    /// Defensive copy of the current handles, safe to hold across a drain.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SharedEntity> {
        self.entities.values().cloned().collect()
    }
}

impl Index for SimpleListIndex {
    fn components(&self) -> &ComponentSet {
        &self.components
    }

    fn entity_added(&mut self, _world: &mut World, entity: &SharedEntity) {
        self.entities.insert(entity.borrow().id(), entity.clone());
    }

    fn entity_removed(&mut self, _world: &mut World, entity: &SharedEntity) {
        self.entities.remove(&entity.borrow().id());
    }
}
