//! The demo entity roster and its observers.
//!
//! A small slice of an RTS scenario: warriors and guard towers occupy
//! tiles, everything with a sprite lands in the render list, fallen
//! buildings leave wreckage behind, and a tile-occupancy tracker follows
//! position changes through the modification channel.

use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::{debug, warn};

use sim_component::{ComponentName, ComponentSet, Entity, EntityBlueprint, SharedEntity};
use sim_world::{Index, ModificationListener, World};

/// Tile coordinates of the entity on the map.
pub const TILE_POSITION: ComponentName = ComponentName::new("tile_position");
/// Drawable sprite state.
pub const SPRITE: ComponentName = ComponentName::new("sprite");
/// Hit points.
pub const HEALTH: ComponentName = ComponentName::new("health");
/// Walk progress and facing direction.
pub const MOVEMENT: ComponentName = ComponentName::new("movement");

/// A walking melee unit.
pub struct Warrior;

impl EntityBlueprint for Warrior {
    fn type_name() -> &'static str {
        "warrior"
    }

    fn component_names() -> ComponentSet {
        [TILE_POSITION, SPRITE, HEALTH, MOVEMENT]
            .into_iter()
            .collect()
    }

    fn construct() -> HashMap<ComponentName, Value> {
        let mut bag = HashMap::new();
        bag.insert(TILE_POSITION, json!({ "x": 0, "y": 0 }));
        bag.insert(SPRITE, json!({ "frame": 0, "image": "warrior" }));
        bag.insert(HEALTH, json!({ "current": 60, "max": 60 }));
        bag.insert(MOVEMENT, json!({ "progress": 0.0, "facing": "south" }));
        bag
    }
}

/// A static defensive building.
pub struct GuardTower;

impl EntityBlueprint for GuardTower {
    fn type_name() -> &'static str {
        "guard_tower"
    }

    fn component_names() -> ComponentSet {
        [TILE_POSITION, SPRITE, HEALTH].into_iter().collect()
    }

    fn construct() -> HashMap<ComponentName, Value> {
        let mut bag = HashMap::new();
        bag.insert(TILE_POSITION, json!({ "x": 0, "y": 0 }));
        bag.insert(SPRITE, json!({ "frame": 0, "image": "guard_tower" }));
        bag.insert(HEALTH, json!({ "current": 200, "max": 200 }));
        bag
    }
}

/// Decorative rubble left where something died. No health, so its own
/// removal never re-triggers the wreckage spawner.
pub struct Wreckage;

impl EntityBlueprint for Wreckage {
    fn type_name() -> &'static str {
        "wreckage"
    }

    fn component_names() -> ComponentSet {
        [TILE_POSITION, SPRITE].into_iter().collect()
    }

    fn construct() -> HashMap<ComponentName, Value> {
        let mut bag = HashMap::new();
        bag.insert(TILE_POSITION, json!({ "x": 0, "y": 0 }));
        bag.insert(SPRITE, json!({ "frame": 0, "image": "wreckage" }));
        bag
    }
}

/// Spawns a [`Wreckage`] entity on the tile of every retired entity that
/// carried health — a cascading index: the wreckage it enqueues is
/// published within the same tick's drain.
pub struct WreckageSpawner {
    components: ComponentSet,
}

impl WreckageSpawner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: [TILE_POSITION, HEALTH].into_iter().collect(),
        }
    }
}

impl Default for WreckageSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Index for WreckageSpawner {
    fn components(&self) -> &ComponentSet {
        &self.components
    }

    fn entity_added(&mut self, _world: &mut World, _entity: &SharedEntity) {}

    fn entity_removed(&mut self, world: &mut World, entity: &SharedEntity) {
        let tile = entity.borrow().component(TILE_POSITION).cloned();
        match world.spawn_entity::<Wreckage>() {
            Ok(wreck) => {
                if let Some(tile) = tile {
                    wreck.borrow_mut().set_component(TILE_POSITION, tile);
                }
                debug!(
                    fallen = %entity.borrow().id(),
                    wreck = %wreck.borrow().id(),
                    "wreckage enqueued"
                );
            }
            Err(err) => warn!(%err, "failed to enqueue wreckage"),
        }
    }
}

/// Tracks which tiles are occupied.
///
/// Registered as both an index (add/remove keep the tile counts in step
/// with the published population) and a modification listener (position
/// changes announced via `notify_entity_modified` move the entity's count
/// between tiles immediately).
pub struct TileOccupancyTracker {
    components: ComponentSet,
    positions: HashMap<Entity, (i64, i64)>,
    counts: HashMap<(i64, i64), usize>,
}

impl TileOccupancyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: [TILE_POSITION].into_iter().collect(),
            positions: HashMap::new(),
            counts: HashMap::new(),
        }
    }

    /// Returns `true` if at least one entity stands on the tile.
    #[must_use]
    pub fn is_occupied(&self, tile: (i64, i64)) -> bool {
        self.counts.contains_key(&tile)
    }

    /// The number of distinct occupied tiles.
    #[must_use]
    pub fn occupied_tiles(&self) -> usize {
        self.counts.len()
    }

    fn tile_of(entity: &SharedEntity) -> Option<(i64, i64)> {
        let data = entity.borrow();
        let tile = data.component(TILE_POSITION)?;
        Some((tile["x"].as_i64()?, tile["y"].as_i64()?))
    }

    fn occupy(&mut self, id: Entity, tile: (i64, i64)) {
        self.positions.insert(id, tile);
        *self.counts.entry(tile).or_insert(0) += 1;
    }

    fn vacate(&mut self, id: Entity) {
        let Some(tile) = self.positions.remove(&id) else {
            return;
        };
        if let Some(count) = self.counts.get_mut(&tile) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&tile);
            }
        }
    }
}

impl Default for TileOccupancyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Index for TileOccupancyTracker {
    fn components(&self) -> &ComponentSet {
        &self.components
    }

    fn entity_added(&mut self, _world: &mut World, entity: &SharedEntity) {
        if let Some(tile) = Self::tile_of(entity) {
            self.occupy(entity.borrow().id(), tile);
        }
    }

    fn entity_removed(&mut self, _world: &mut World, entity: &SharedEntity) {
        self.vacate(entity.borrow().id());
    }
}

impl ModificationListener for TileOccupancyTracker {
    fn watched_component(&self) -> ComponentName {
        TILE_POSITION
    }

    fn entity_modified(&mut self, entity: &SharedEntity) {
        let id = entity.borrow().id();
        // Entities still waiting for publication are not tracked yet; their
        // tile is picked up by entity_added.
        if !self.positions.contains_key(&id) {
            return;
        }
        let Some(tile) = Self::tile_of(entity) else {
            return;
        };
        if self.positions.get(&id) == Some(&tile) {
            return;
        }
        self.vacate(id);
        self.occupy(id, tile);
    }
}
