//! # sim_app — demo skirmish
//!
//! Drives the simulation backbone through a small scripted scenario:
//!
//! 1. Tick 0 — a warrior and a guard tower are founded on the map.
//! 2. Tick 3 — the warrior walks one tile south (modification channel).
//! 3. Tick 6 — the tower falls; the wreckage-spawner index cascades a
//!    wreckage entity onto its tile within the same tick.

mod runner;
mod units;

use anyhow::Result;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sim_component::Entity;
use sim_world::{SimpleListIndex, World};

use runner::{SimConfig, SimulationLoop};
use units::{
    GuardTower, TileOccupancyTracker, Warrior, Wreckage, WreckageSpawner, SPRITE, TILE_POSITION,
};

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sim_app=info".parse()?))
        .init();

    info!("simulation backbone demo starting");

    let mut world = World::new();
    world.register_entity_type::<Warrior>()?;
    world.register_entity_type::<GuardTower>()?;
    world.register_entity_type::<Wreckage>()?;

    let render_list = SimpleListIndex::register(&mut world, [SPRITE].into_iter().collect())?;
    world.register_index(WreckageSpawner::new())?;
    let occupancy = world.register_index_and_listener(TileOccupancyTracker::new())?;

    world.lock_types()?;
    info!("world locked, entering simulation");

    let mut warrior = None;
    let mut tower_id = Entity::INVALID;

    let config = SimConfig {
        tick_rate: 20.0,
        max_ticks: 10,
    };
    let mut sim = SimulationLoop::new(world, config);
    sim.run(|w, tick| {
        match tick {
            0 => {
                let unit = w.spawn_entity::<Warrior>()?;
                unit.borrow_mut()
                    .set_component(TILE_POSITION, json!({ "x": 4, "y": 4 }));
                warrior = Some(unit);

                let tower = w.spawn_entity::<GuardTower>()?;
                tower_id = tower.borrow().id();
                tower
                    .borrow_mut()
                    .set_component(TILE_POSITION, json!({ "x": 8, "y": 2 }));
            }
            3 => {
                if let Some(unit) = &warrior {
                    unit.borrow_mut()
                        .set_component(TILE_POSITION, json!({ "x": 4, "y": 5 }));
                    w.notify_entity_modified(unit, TILE_POSITION)?;
                    info!(unit = %unit.borrow().id(), "warrior moved south");
                }
            }
            6 => {
                w.remove_entity(tower_id)?;
                info!(tower = %tower_id, "guard tower destroyed");
            }
            _ => {}
        }
        Ok(())
    })?;

    info!(
        entities = sim.world().entity_count(),
        renderables = render_list.borrow().len(),
        occupied_tiles = occupancy.borrow().occupied_tiles(),
        "simulation finished"
    );
    Ok(())
}
