//! World engine error types.
//!
//! Every variant is a programming-contract violation, not a runtime
//! condition: they fail fast at the call site and should never be caught
//! and retried.

/// Errors surfaced by the [`World`](crate::World) contract.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorldError {
    /// Registration attempted after `lock_types()`.
    #[error("world is locked")]
    WorldLocked,

    /// `lock_types()` called more than once.
    #[error("entity types are already locked")]
    AlreadyLocked,

    /// An entity type with this name is already registered.
    #[error("entity type '{0}' has already been registered")]
    AlreadyRegistered(&'static str),

    /// An entity type declared no components.
    #[error("entity type '{0}' declares no components")]
    InvalidDefinition(&'static str),

    /// A runtime operation was attempted before `lock_types()`.
    #[error("world is not locked")]
    NotLocked,

    /// A runtime mutation was attempted outside `execute_tick`.
    #[error("game logic is not executing now")]
    NotExecutingTick,

    /// `spawn_entity` was given a type that was never registered.
    #[error("entity type '{0}' is not registered")]
    UnknownEntityType(&'static str),

    /// `execute_tick` was invoked while a tick is already executing.
    #[error("a tick is already executing")]
    TickInProgress,
}
