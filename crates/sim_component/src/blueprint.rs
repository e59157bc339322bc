//! The [`EntityBlueprint`] trait — the contract an entity type declares.
//!
//! An entity type is a named blueprint: a fixed, non-empty set of component
//! names plus a constructor that produces a fresh bare component bag. The
//! declared set must be readable before any instance exists, because the
//! world resolves index triggers from it at lock time.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashMap;
//! use serde_json::{json, Value};
//! use sim_component::{ComponentName, ComponentSet, EntityBlueprint};
//!
//! const TILE_POSITION: ComponentName = ComponentName::new("tile_position");
//! const HEALTH: ComponentName = ComponentName::new("health");
//!
//! struct Warrior;
//!
//! impl EntityBlueprint for Warrior {
//!     fn type_name() -> &'static str {
//!         "warrior"
//!     }
//!
//!     fn component_names() -> ComponentSet {
//!         [TILE_POSITION, HEALTH].into_iter().collect()
//!     }
//!
//!     fn construct() -> HashMap<ComponentName, Value> {
//!         let mut bag = HashMap::new();
//!         bag.insert(TILE_POSITION, json!({ "x": 0, "y": 0 }));
//!         bag.insert(HEALTH, json!({ "current": 100, "max": 100 }));
//!         bag
//!     }
//! }
//! ```

use std::collections::HashMap;

use serde_json::Value;

use crate::component::{ComponentName, ComponentSet};

/// A registered entity type's blueprint.
///
/// Implementations are zero-sized marker types; the world stores the
/// associated functions, not instances.
pub trait EntityBlueprint {
    /// The unique registry key for this entity type.
    fn type_name() -> &'static str;

    /// The components every instance of this type carries.
    ///
    /// Must be non-empty — registration rejects blueprints that declare
    /// no components.
    fn component_names() -> ComponentSet;

    /// Produce the initial component payloads for a fresh instance.
    ///
    /// The returned bag should cover every name in
    /// [`component_names`](Self::component_names); the spawn caller then
    /// overwrites individual payloads before the entity is published.
    fn construct() -> HashMap<ComponentName, Value>;
}
