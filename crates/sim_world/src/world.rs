//! The [`World`] — entity lifecycle and indexing engine.
//!
//! The world tracks every live game object and is the sole place structural
//! mutation is legal. It has a two-phase lifecycle:
//!
//! 1. **Setup**: entity types, indexes, and modification listeners are
//!    registered, then `lock_types()` fixes the registries and resolves
//!    each type's trigger list.
//! 2. **Runtime**: `execute_tick` runs game logic, which may enqueue
//!    spawns/removals and fire modification notifications; at tick end the
//!    queues are drained and every structural change is published to the
//!    matching indexes.
//!
//! Structural changes are never visible mid-tick: `spawn_entity` only
//! enqueues, and the drained entity becomes reachable by id lookup at the
//! tick boundary.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use sim_component::{
    share, ComponentName, ComponentSet, Entity, EntityAllocator, EntityBlueprint, EntityData,
    SharedEntity,
};

use crate::error::WorldError;
use crate::observer::{Index, ModificationListener};

/// The simulation tick counter type.
pub type Tick = u64;

/// Shared handle to a registered index.
pub type SharedIndex = Rc<RefCell<dyn Index>>;

/// Shared handle to a registered modification listener.
pub type SharedListener = Rc<RefCell<dyn ModificationListener>>;

/// A registered entity type: its component set, constructor, and the
/// indexes it triggers (resolved once at lock time).
struct EntityTypeInfo {
    name: &'static str,
    components: ComponentSet,
    construct: fn() -> HashMap<ComponentName, Value>,
    triggers: Vec<SharedIndex>,
}

/// Entities container and tick-commit orchestrator.
///
/// One world instance per game session. The world exclusively owns the
/// published entity map, the pending queues, and both registries; external
/// code mutates them only through the methods below.
pub struct World {
    current_tick: Tick,
    allocator: EntityAllocator,
    /// Published entities only — enqueued spawns are not in here yet.
    entities: HashMap<Entity, SharedEntity>,
    entity_types: HashMap<&'static str, EntityTypeInfo>,
    /// All indexes in registration order; trigger order follows this.
    indexes: Vec<SharedIndex>,
    listeners: HashMap<ComponentName, Vec<SharedListener>>,
    pending_spawns: Vec<SharedEntity>,
    pending_removals: Vec<Entity>,
    prototypes_locked: bool,
    executing_tick: bool,
}

impl World {
    /// Create a new empty world in the setup phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_tick: 0,
            allocator: EntityAllocator::new(),
            entities: HashMap::new(),
            entity_types: HashMap::new(),
            indexes: Vec::new(),
            listeners: HashMap::new(),
            pending_spawns: Vec::new(),
            pending_removals: Vec::new(),
            prototypes_locked: false,
            executing_tick: false,
        }
    }

    // -- Setup phase --

    /// Register an entity type by its blueprint.
    ///
    /// Fails with [`WorldError::WorldLocked`] after `lock_types()`,
    /// [`WorldError::AlreadyRegistered`] on a duplicate name, and
    /// [`WorldError::InvalidDefinition`] if the blueprint declares no
    /// components.
    pub fn register_entity_type<B: EntityBlueprint>(&mut self) -> Result<(), WorldError> {
        if self.prototypes_locked {
            return Err(WorldError::WorldLocked);
        }
        let name = B::type_name();
        if self.entity_types.contains_key(name) {
            return Err(WorldError::AlreadyRegistered(name));
        }
        let components = B::component_names();
        if components.is_empty() {
            return Err(WorldError::InvalidDefinition(name));
        }

        self.entity_types.insert(
            name,
            EntityTypeInfo {
                name,
                components,
                construct: B::construct,
                triggers: Vec::new(),
            },
        );
        Ok(())
    }

    /// Register an index. Registration order is trigger order.
    ///
    /// Returns a shared handle so the caller can query the index after the
    /// world takes ownership. Fails with [`WorldError::WorldLocked`] after
    /// `lock_types()`.
    pub fn register_index<I: Index + 'static>(
        &mut self,
        index: I,
    ) -> Result<Rc<RefCell<I>>, WorldError> {
        if self.prototypes_locked {
            return Err(WorldError::WorldLocked);
        }
        let handle = Rc::new(RefCell::new(index));
        self.indexes.push(handle.clone());
        Ok(handle)
    }

    /// Register a modification listener for its watched component.
    ///
    /// Multiple listeners may watch the same component; they are notified
    /// in registration order. Fails with [`WorldError::WorldLocked`] after
    /// `lock_types()`.
    pub fn register_modification_listener<L: ModificationListener + 'static>(
        &mut self,
        listener: L,
    ) -> Result<Rc<RefCell<L>>, WorldError> {
        if self.prototypes_locked {
            return Err(WorldError::WorldLocked);
        }
        let component = listener.watched_component();
        let handle = Rc::new(RefCell::new(listener));
        self.listeners
            .entry(component)
            .or_default()
            .push(handle.clone());
        Ok(handle)
    }

    /// Register one object as both an index and a modification listener.
    ///
    /// Both registrations share a single handle; a tile-occupancy tracker
    /// that wants add/remove events and position-change events is the
    /// typical user.
    pub fn register_index_and_listener<T: Index + ModificationListener + 'static>(
        &mut self,
        observer: T,
    ) -> Result<Rc<RefCell<T>>, WorldError> {
        if self.prototypes_locked {
            return Err(WorldError::WorldLocked);
        }
        let component = observer.watched_component();
        let handle = Rc::new(RefCell::new(observer));
        self.indexes.push(handle.clone());
        self.listeners
            .entry(component)
            .or_default()
            .push(handle.clone());
        Ok(handle)
    }

    /// Transition from setup to runtime phase.
    ///
    /// Resolves every entity type's trigger list: the registration-ordered
    /// subsequence of indexes whose component requirement is contained in
    /// the type's declared set. Fails with [`WorldError::AlreadyLocked`] on
    /// a second call; afterwards all registration methods fail with
    /// [`WorldError::WorldLocked`].
    pub fn lock_types(&mut self) -> Result<(), WorldError> {
        if self.prototypes_locked {
            return Err(WorldError::AlreadyLocked);
        }
        self.prototypes_locked = true;

        for info in self.entity_types.values_mut() {
            for index in &self.indexes {
                let matches = index.borrow().components().is_subset(&info.components);
                if matches {
                    info.triggers.push(Rc::clone(index));
                }
            }
            trace!(
                entity_type = info.name,
                triggers = info.triggers.len(),
                "resolved index triggers"
            );
        }

        debug!(
            entity_types = self.entity_types.len(),
            indexes = self.indexes.len(),
            "entity types locked"
        );
        Ok(())
    }

    // -- Runtime phase --

    /// Enqueue a new entity of the given type.
    ///
    /// The id is assigned immediately and the returned handle is live —
    /// the caller may populate component payloads on it synchronously —
    /// but the entity is invisible to [`get_spawned_entity`](Self::get_spawned_entity)
    /// and to every index until this tick's drain runs.
    pub fn spawn_entity<B: EntityBlueprint>(&mut self) -> Result<SharedEntity, WorldError> {
        if !self.prototypes_locked {
            return Err(WorldError::NotLocked);
        }
        if !self.executing_tick {
            return Err(WorldError::NotExecutingTick);
        }
        let info = self
            .entity_types
            .get(B::type_name())
            .ok_or(WorldError::UnknownEntityType(B::type_name()))?;

        let id = self.allocator.allocate();
        let entity = share(EntityData::new(id, info.name, (info.construct)()));
        self.pending_spawns.push(entity.clone());
        trace!(entity = %id, entity_type = info.name, "entity enqueued for spawn");
        Ok(entity)
    }

    /// Enqueue an entity for removal.
    ///
    /// Ids that do not correspond to a published entity when the queue
    /// drains are skipped silently — removing an already-removed or
    /// never-published id is not an error.
    pub fn remove_entity(&mut self, id: Entity) -> Result<(), WorldError> {
        if !self.prototypes_locked {
            return Err(WorldError::NotLocked);
        }
        if !self.executing_tick {
            return Err(WorldError::NotExecutingTick);
        }
        self.pending_removals.push(id);
        Ok(())
    }

    /// Look up a published entity by id.
    ///
    /// Returns `None` for unknown ids and for entities that are enqueued
    /// but not yet published.
    #[must_use]
    pub fn get_spawned_entity(&self, id: Entity) -> Option<SharedEntity> {
        self.entities.get(&id).cloned()
    }

    /// Announce an in-place component change on an entity.
    ///
    /// Every listener watching `component` is invoked synchronously, in
    /// registration order, before this call returns. No queueing: component
    /// mutation never changes index membership, so there is nothing to
    /// defer to the tick boundary.
    pub fn notify_entity_modified(
        &self,
        entity: &SharedEntity,
        component: ComponentName,
    ) -> Result<(), WorldError> {
        if !self.executing_tick {
            return Err(WorldError::NotExecutingTick);
        }
        if let Some(listeners) = self.listeners.get(&component) {
            for listener in listeners {
                listener.borrow_mut().entity_modified(entity);
            }
        }
        Ok(())
    }

    /// Execute one simulation tick.
    ///
    /// Runs `logic` with the pre-increment tick counter, increments the
    /// counter, then drains the spawn and removal queues until both are
    /// empty: each pass snapshots a queue, publishes (or retires) its
    /// entries in enqueue order, and fires the type's triggers in trigger
    /// order. Indexes reacting by spawning or removing further entities
    /// feed the next pass, so cascades never leak into the next tick.
    ///
    /// If `logic` returns an error the tick aborts: both queues are
    /// cleared, nothing is published, and the error propagates. Re-entrant
    /// invocation fails with [`WorldError::TickInProgress`].
    pub fn execute_tick<F>(&mut self, logic: F) -> Result<(), WorldError>
    where
        F: FnOnce(&mut World, Tick) -> Result<(), WorldError>,
    {
        if self.executing_tick {
            return Err(WorldError::TickInProgress);
        }
        if !self.prototypes_locked {
            return Err(WorldError::NotLocked);
        }
        self.executing_tick = true;
        let tick = self.current_tick;
        debug!(tick_id = tick, "tick start");

        if let Err(err) = logic(self, tick) {
            self.pending_spawns.clear();
            self.pending_removals.clear();
            self.executing_tick = false;
            return Err(err);
        }
        self.current_tick += 1;

        self.drain_queues();
        self.executing_tick = false;
        Ok(())
    }

    /// Drain the spawn and removal queues until both are empty.
    fn drain_queues(&mut self) {
        while !self.pending_spawns.is_empty() || !self.pending_removals.is_empty() {
            let spawns = std::mem::take(&mut self.pending_spawns);
            for entity in spawns {
                let (id, type_name) = {
                    let data = entity.borrow();
                    (data.id(), data.type_name())
                };
                self.entities.insert(id, entity.clone());
                trace!(entity = %id, entity_type = type_name, "entity published");
                for trigger in self.triggers_of(type_name) {
                    trigger.borrow_mut().entity_added(self, &entity);
                }
            }

            let removals = std::mem::take(&mut self.pending_removals);
            for id in removals {
                let Some(entity) = self.entities.remove(&id) else {
                    // Never published, or already removed — tolerated.
                    continue;
                };
                let type_name = entity.borrow().type_name();
                trace!(entity = %id, entity_type = type_name, "entity retired");
                for trigger in self.triggers_of(type_name) {
                    trigger.borrow_mut().entity_removed(self, &entity);
                }
            }
        }
    }

    /// Clone out a type's trigger list so dispatch does not hold a borrow
    /// of the registry across the callback.
    fn triggers_of(&self, type_name: &'static str) -> Vec<SharedIndex> {
        self.entity_types
            .get(type_name)
            .map(|info| info.triggers.clone())
            .unwrap_or_default()
    }

    // -- Queries --

    /// The tick counter: the number of fully executed ticks so far.
    #[must_use]
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// The number of published entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Whether the setup phase is over.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.prototypes_locked
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TILE_POSITION: ComponentName = ComponentName::new("tile_position");
    const HEALTH: ComponentName = ComponentName::new("health");
    const SPRITE: ComponentName = ComponentName::new("sprite");
    const MANA: ComponentName = ComponentName::new("mana");

    struct Warrior;

    impl EntityBlueprint for Warrior {
        fn type_name() -> &'static str {
            "warrior"
        }

        fn component_names() -> ComponentSet {
            [TILE_POSITION, HEALTH].into_iter().collect()
        }

        fn construct() -> HashMap<ComponentName, Value> {
            let mut bag = HashMap::new();
            bag.insert(TILE_POSITION, json!({ "x": 0, "y": 0 }));
            bag.insert(HEALTH, json!({ "current": 100, "max": 100 }));
            bag
        }
    }

    struct Wreck;

    impl EntityBlueprint for Wreck {
        fn type_name() -> &'static str {
            "wreck"
        }

        fn component_names() -> ComponentSet {
            [TILE_POSITION, SPRITE].into_iter().collect()
        }

        fn construct() -> HashMap<ComponentName, Value> {
            let mut bag = HashMap::new();
            bag.insert(TILE_POSITION, json!({ "x": 0, "y": 0 }));
            bag.insert(SPRITE, json!({ "frame": 0 }));
            bag
        }
    }

    struct Hollow;

    impl EntityBlueprint for Hollow {
        fn type_name() -> &'static str {
            "hollow"
        }

        fn component_names() -> ComponentSet {
            ComponentSet::new()
        }

        fn construct() -> HashMap<ComponentName, Value> {
            HashMap::new()
        }
    }

    /// Records every callback as `"<label>:+<id>"` / `"<label>:-<id>"`
    /// into a log shared with the test body.
    struct RecordingIndex {
        label: &'static str,
        components: ComponentSet,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl RecordingIndex {
        fn new(
            label: &'static str,
            components: &[ComponentName],
            log: Rc<RefCell<Vec<String>>>,
        ) -> Self {
            Self {
                label,
                components: components.iter().copied().collect(),
                log,
            }
        }
    }

    impl Index for RecordingIndex {
        fn components(&self) -> &ComponentSet {
            &self.components
        }

        fn entity_added(&mut self, _world: &mut World, entity: &SharedEntity) {
            self.log
                .borrow_mut()
                .push(format!("{}:+{}", self.label, entity.borrow().id().id()));
        }

        fn entity_removed(&mut self, _world: &mut World, entity: &SharedEntity) {
            self.log
                .borrow_mut()
                .push(format!("{}:-{}", self.label, entity.borrow().id().id()));
        }
    }

    struct RecordingListener {
        component: ComponentName,
        seen: Vec<Entity>,
    }

    impl RecordingListener {
        fn new(component: ComponentName) -> Self {
            Self {
                component,
                seen: Vec::new(),
            }
        }
    }

    impl ModificationListener for RecordingListener {
        fn watched_component(&self) -> ComponentName {
            self.component
        }

        fn entity_modified(&mut self, entity: &SharedEntity) {
            self.seen.push(entity.borrow().id());
        }
    }

    /// Spawns one wreck per observed warrior, up to a fixed budget.
    struct WreckSpawner {
        components: ComponentSet,
        budget: usize,
        spawned: usize,
    }

    impl WreckSpawner {
        fn new(budget: usize) -> Self {
            Self {
                components: [HEALTH].into_iter().collect(),
                budget,
                spawned: 0,
            }
        }
    }

    impl Index for WreckSpawner {
        fn components(&self) -> &ComponentSet {
            &self.components
        }

        fn entity_added(&mut self, world: &mut World, _entity: &SharedEntity) {
            if self.spawned < self.budget {
                self.spawned += 1;
                world.spawn_entity::<Wreck>().unwrap();
            }
        }

        fn entity_removed(&mut self, _world: &mut World, _entity: &SharedEntity) {}
    }

    fn locked_world() -> World {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();
        world.register_entity_type::<Wreck>().unwrap();
        world.lock_types().unwrap();
        world
    }

    #[test]
    fn test_register_duplicate_type_fails() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();
        assert_eq!(
            world.register_entity_type::<Warrior>(),
            Err(WorldError::AlreadyRegistered("warrior"))
        );
    }

    #[test]
    fn test_register_type_without_components_fails() {
        let mut world = World::new();
        assert_eq!(
            world.register_entity_type::<Hollow>(),
            Err(WorldError::InvalidDefinition("hollow"))
        );
    }

    #[test]
    fn test_registration_after_lock_fails() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();
        world.lock_types().unwrap();

        assert_eq!(
            world.register_entity_type::<Wreck>(),
            Err(WorldError::WorldLocked)
        );

        let log = Rc::new(RefCell::new(Vec::new()));
        let index = RecordingIndex::new("a", &[TILE_POSITION], log);
        assert!(matches!(
            world.register_index(index),
            Err(WorldError::WorldLocked)
        ));
        assert!(matches!(
            world.register_modification_listener(RecordingListener::new(HEALTH)),
            Err(WorldError::WorldLocked)
        ));
    }

    #[test]
    fn test_lock_twice_fails() {
        let mut world = World::new();
        world.lock_types().unwrap();
        assert_eq!(world.lock_types(), Err(WorldError::AlreadyLocked));
        assert!(world.is_locked());
    }

    #[test]
    fn test_spawn_before_lock_fails() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();
        assert!(matches!(
            world.spawn_entity::<Warrior>(),
            Err(WorldError::NotLocked)
        ));
    }

    #[test]
    fn test_spawn_outside_tick_fails() {
        let mut world = locked_world();
        assert!(matches!(
            world.spawn_entity::<Warrior>(),
            Err(WorldError::NotExecutingTick)
        ));
    }

    #[test]
    fn test_remove_outside_tick_fails() {
        let mut world = locked_world();
        assert_eq!(
            world.remove_entity(Entity::from_raw(1)),
            Err(WorldError::NotExecutingTick)
        );
    }

    #[test]
    fn test_spawn_unregistered_type_fails() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();
        world.lock_types().unwrap();
        world
            .execute_tick(|w, _| {
                assert!(matches!(
                    w.spawn_entity::<Wreck>(),
                    Err(WorldError::UnknownEntityType("wreck"))
                ));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_execute_tick_before_lock_fails() {
        let mut world = World::new();
        assert_eq!(
            world.execute_tick(|_, _| Ok(())),
            Err(WorldError::NotLocked)
        );
    }

    #[test]
    fn test_reentrant_execute_tick_fails() {
        let mut world = locked_world();
        world
            .execute_tick(|w, _| {
                assert_eq!(
                    w.execute_tick(|_, _| Ok(())),
                    Err(WorldError::TickInProgress)
                );
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_spawned_entity_invisible_until_drain() {
        let mut world = locked_world();
        let mut spawned_id = Entity::INVALID;

        world
            .execute_tick(|w, _| {
                let entity = w.spawn_entity::<Warrior>()?;
                spawned_id = entity.borrow().id();
                // Enqueued, not published.
                assert!(w.get_spawned_entity(spawned_id).is_none());
                assert_eq!(w.entity_count(), 0);
                Ok(())
            })
            .unwrap();

        let entity = world.get_spawned_entity(spawned_id).unwrap();
        assert_eq!(entity.borrow().type_name(), "warrior");
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_spawned_handle_is_live_before_publication() {
        let mut world = locked_world();
        let mut spawned_id = Entity::INVALID;

        world
            .execute_tick(|w, _| {
                let entity = w.spawn_entity::<Warrior>()?;
                spawned_id = entity.borrow().id();
                entity
                    .borrow_mut()
                    .set_component(TILE_POSITION, json!({ "x": 4, "y": 9 }));
                Ok(())
            })
            .unwrap();

        // Payload written through the pre-publication handle survives.
        let entity = world.get_spawned_entity(spawned_id).unwrap();
        assert_eq!(entity.borrow().component(TILE_POSITION).unwrap()["y"], 9);
    }

    #[test]
    fn test_triggers_fire_in_registration_order() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        world
            .register_index(RecordingIndex::new("a", &[TILE_POSITION], log.clone()))
            .unwrap();
        world
            .register_index(RecordingIndex::new(
                "b",
                &[TILE_POSITION, HEALTH],
                log.clone(),
            ))
            .unwrap();
        // Requirement not satisfied by any type — must never fire.
        world
            .register_index(RecordingIndex::new("c", &[MANA], log.clone()))
            .unwrap();
        world.lock_types().unwrap();

        world
            .execute_tick(|w, _| {
                w.spawn_entity::<Warrior>()?;
                Ok(())
            })
            .unwrap();

        assert_eq!(*log.borrow(), vec!["a:+1".to_string(), "b:+1".to_string()]);
    }

    #[test]
    fn test_entities_published_in_enqueue_order() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        world
            .register_index(RecordingIndex::new("a", &[HEALTH], log.clone()))
            .unwrap();
        world.lock_types().unwrap();

        world
            .execute_tick(|w, _| {
                w.spawn_entity::<Warrior>()?;
                w.spawn_entity::<Warrior>()?;
                w.spawn_entity::<Warrior>()?;
                Ok(())
            })
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["a:+1".to_string(), "a:+2".to_string(), "a:+3".to_string()]
        );
    }

    #[test]
    fn test_spawn_then_remove_scenario() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        world
            .register_index(RecordingIndex::new("a", &[TILE_POSITION], log.clone()))
            .unwrap();
        world.lock_types().unwrap();

        let mut id = Entity::INVALID;
        world
            .execute_tick(|w, tick| {
                assert_eq!(tick, 0);
                id = w.spawn_entity::<Warrior>()?.borrow().id();
                Ok(())
            })
            .unwrap();

        assert_eq!(*log.borrow(), vec!["a:+1".to_string()]);
        assert!(world.get_spawned_entity(id).is_some());

        world
            .execute_tick(|w, tick| {
                assert_eq!(tick, 1);
                w.remove_entity(id)
            })
            .unwrap();

        assert_eq!(*log.borrow(), vec!["a:+1".to_string(), "a:-1".to_string()]);
        assert!(world.get_spawned_entity(id).is_none());
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_removal_of_unknown_id_is_ignored() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        world
            .register_index(RecordingIndex::new("a", &[TILE_POSITION], log.clone()))
            .unwrap();
        world.lock_types().unwrap();

        world
            .execute_tick(|w, _| {
                w.remove_entity(Entity::from_raw(999))?;
                Ok(())
            })
            .unwrap();

        // No callback, no error.
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_double_removal_is_idempotent() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        world
            .register_index(RecordingIndex::new("a", &[TILE_POSITION], log.clone()))
            .unwrap();
        world.lock_types().unwrap();

        let mut id = Entity::INVALID;
        world
            .execute_tick(|w, _| {
                id = w.spawn_entity::<Warrior>()?.borrow().id();
                Ok(())
            })
            .unwrap();

        world
            .execute_tick(|w, _| {
                w.remove_entity(id)?;
                w.remove_entity(id)?;
                Ok(())
            })
            .unwrap();
        world.execute_tick(|w, _| w.remove_entity(id)).unwrap();

        // Exactly one removal callback despite three requests.
        assert_eq!(*log.borrow(), vec!["a:+1".to_string(), "a:-1".to_string()]);
    }

    #[test]
    fn test_cascade_drained_within_one_tick() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();
        world.register_entity_type::<Wreck>().unwrap();
        world.register_index(WreckSpawner::new(4)).unwrap();
        world.lock_types().unwrap();

        world
            .execute_tick(|w, _| {
                w.spawn_entity::<Warrior>()?;
                Ok(())
            })
            .unwrap();

        // One warrior plus the full cascade budget of wrecks, all published
        // by the same tick.
        assert_eq!(world.entity_count(), 5);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut world = locked_world();
        let mut first = Entity::INVALID;
        world
            .execute_tick(|w, _| {
                first = w.spawn_entity::<Warrior>()?.borrow().id();
                Ok(())
            })
            .unwrap();
        world.execute_tick(|w, _| w.remove_entity(first)).unwrap();

        let mut second = Entity::INVALID;
        world
            .execute_tick(|w, _| {
                second = w.spawn_entity::<Warrior>()?.borrow().id();
                Ok(())
            })
            .unwrap();

        assert!(second.id() > first.id());
    }

    #[test]
    fn test_modification_listener_isolation_and_synchrony() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();
        let position_listener = world
            .register_modification_listener(RecordingListener::new(TILE_POSITION))
            .unwrap();
        let health_listener = world
            .register_modification_listener(RecordingListener::new(HEALTH))
            .unwrap();
        world.lock_types().unwrap();

        let inspector = position_listener.clone();
        world
            .execute_tick(|w, _| {
                let entity = w.spawn_entity::<Warrior>()?;
                let id = entity.borrow().id();
                w.notify_entity_modified(&entity, TILE_POSITION)?;
                // Delivered before the notify call returned.
                assert_eq!(inspector.borrow().seen, vec![id]);
                Ok(())
            })
            .unwrap();

        assert_eq!(position_listener.borrow().seen.len(), 1);
        assert!(health_listener.borrow().seen.is_empty());
    }

    #[test]
    fn test_listeners_notified_in_registration_order() {
        let mut world = World::new();
        world.register_entity_type::<Warrior>().unwrap();
        let first = world
            .register_modification_listener(RecordingListener::new(HEALTH))
            .unwrap();
        let second = world
            .register_modification_listener(RecordingListener::new(HEALTH))
            .unwrap();
        world.lock_types().unwrap();

        let (a, b) = (first.clone(), second.clone());
        world
            .execute_tick(|w, _| {
                let entity = w.spawn_entity::<Warrior>()?;
                w.notify_entity_modified(&entity, HEALTH)?;
                assert_eq!(a.borrow().seen.len(), 1);
                assert_eq!(b.borrow().seen.len(), 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_notify_outside_tick_fails() {
        let mut world = locked_world();
        let mut handle = None;
        world
            .execute_tick(|w, _| {
                handle = Some(w.spawn_entity::<Warrior>()?);
                Ok(())
            })
            .unwrap();

        let entity = handle.unwrap();
        assert_eq!(
            world.notify_entity_modified(&entity, HEALTH),
            Err(WorldError::NotExecutingTick)
        );
    }

    #[test]
    fn test_tick_counter_advances_per_tick() {
        let mut world = locked_world();
        assert_eq!(world.current_tick(), 0);
        world
            .execute_tick(|_, tick| {
                assert_eq!(tick, 0);
                Ok(())
            })
            .unwrap();
        world
            .execute_tick(|_, tick| {
                assert_eq!(tick, 1);
                Ok(())
            })
            .unwrap();
        assert_eq!(world.current_tick(), 2);
    }

    #[test]
    fn test_failed_logic_aborts_tick() {
        let mut world = locked_world();
        let result = world.execute_tick(|w, _| {
            w.spawn_entity::<Warrior>()?;
            Err(WorldError::NotExecutingTick) // any logic-level failure
        });
        assert_eq!(result, Err(WorldError::NotExecutingTick));

        // Nothing published, counter untouched, world usable again.
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.current_tick(), 0);
        world
            .execute_tick(|w, _| {
                w.spawn_entity::<Warrior>()?;
                Ok(())
            })
            .unwrap();
        assert_eq!(world.entity_count(), 1);
    }
}
