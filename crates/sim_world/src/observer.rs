//! Observer contracts: [`Index`] and [`ModificationListener`].
//!
//! Auxiliary subsystems (render lists, tile-occupancy trackers, chunked
//! spatial indexes) observe the entity population through these two traits
//! instead of being hard-wired into the simulation loop. The world is the
//! only caller; callback ordering is the only synchronisation a concrete
//! observer needs.

use sim_component::{ComponentName, ComponentSet, SharedEntity};

use crate::world::World;

/// An observer of entity publication and retirement.
///
/// An index declares a component-set requirement; the world notifies it for
/// every entity whose type declares a superset of that requirement. The
/// association is resolved once, when the world is locked.
///
/// `entity_added` / `entity_removed` receive the world mutably so a
/// reacting index may enqueue further spawns or removals — such cascades
/// are fully drained within the same tick.
pub trait Index {
    /// The components an entity type must declare for this index to observe it.
    fn components(&self) -> &ComponentSet;

    /// Called after an entity is published (visible to lookup).
    fn entity_added(&mut self, world: &mut World, entity: &SharedEntity);

    /// Called after an entity is retired (no longer visible to lookup).
    fn entity_removed(&mut self, world: &mut World, entity: &SharedEntity);
}

/// An observer of in-place component mutation.
///
/// Listeners are invoked synchronously by
/// [`World::notify_entity_modified`](crate::World::notify_entity_modified),
/// while a tick is executing. Mutation never changes an entity's index
/// membership, so there is no tick-boundary deferral on this channel.
pub trait ModificationListener {
    /// The single component whose changes this listener wants to hear about.
    fn watched_component(&self) -> ComponentName;

    /// Called for every `notify_entity_modified` with a matching component.
    fn entity_modified(&mut self, entity: &SharedEntity);
}
