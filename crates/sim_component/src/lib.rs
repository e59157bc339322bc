//! # sim_component
//!
//! The data half of the simulation backbone — defines what an entity is,
//! how its component data is stored, and how entity types are declared.
//!
//! This crate provides:
//!
//! - [`Entity`] — lightweight `u64` entity identifiers.
//! - [`EntityAllocator`] — monotonically increasing ID allocator.
//! - [`EntityData`] / [`SharedEntity`] — the per-entity dynamic component bag.
//! - [`ComponentName`] — interned names identifying component facets.
//! - [`EntityBlueprint`] — the contract an entity type declares before
//!   it can be registered with a world.

pub mod blueprint;
pub mod component;
pub mod entity;

pub use blueprint::EntityBlueprint;
pub use component::{component_set, ComponentName, ComponentSet};
pub use entity::{share, Entity, EntityAllocator, EntityData, SharedEntity};
