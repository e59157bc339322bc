//! # sim_world
//!
//! Entity lifecycle and indexing engine — the simulation backbone of the
//! tile-RTS. The [`World`] tracks which entities exist, what components
//! they expose, and who gets told when that changes.
//!
//! This crate provides:
//!
//! - [`World`] — registration, lockdown, deferred spawn/removal queues,
//!   and the tick-commit protocol.
//! - [`Index`] / [`ModificationListener`] — the observer contracts
//!   auxiliary subsystems implement.
//! - [`SimpleListIndex`] — the reference index implementation.
//! - [`WorldError`] — the contract-violation error taxonomy.
//!
//! ## Lifecycle
//!
//! ```rust
//! use std::collections::HashMap;
//! use serde_json::{json, Value};
//! use sim_component::{ComponentName, ComponentSet, EntityBlueprint};
//! use sim_world::{SimpleListIndex, World};
//!
//! const TILE_POSITION: ComponentName = ComponentName::new("tile_position");
//!
//! struct Flag;
//!
//! impl EntityBlueprint for Flag {
//!     fn type_name() -> &'static str {
//!         "flag"
//!     }
//!
//!     fn component_names() -> ComponentSet {
//!         [TILE_POSITION].into_iter().collect()
//!     }
//!
//!     fn construct() -> HashMap<ComponentName, Value> {
//!         let mut bag = HashMap::new();
//!         bag.insert(TILE_POSITION, json!({ "x": 0, "y": 0 }));
//!         bag
//!     }
//! }
//!
//! let mut world = World::new();
//! world.register_entity_type::<Flag>().unwrap();
//! let flags =
//!     SimpleListIndex::register(&mut world, [TILE_POSITION].into_iter().collect()).unwrap();
//! world.lock_types().unwrap();
//!
//! world
//!     .execute_tick(|w, _tick| {
//!         w.spawn_entity::<Flag>()?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(flags.borrow().len(), 1);
//! ```

pub mod error;
pub mod index;
pub mod observer;
pub mod world;

pub use error::WorldError;
pub use index::SimpleListIndex;
pub use observer::{Index, ModificationListener};
pub use world::{SharedIndex, SharedListener, Tick, World};
