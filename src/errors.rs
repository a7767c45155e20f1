//! Error Types
//!
//! This module defines the error types used throughout the registry.
//!
//! # Overview
//!
//! The main error type [`RegistryError`] covers every failure mode of the
//! registry:
//! - Lookups of VIDs that are not registered
//! - Ownership violations (system-owned or asset-owned resources)
//! - Scene graph mutations that would break the hierarchy
//! - Internal consistency violations
//!
//! Not-found lookups through the `get_*` accessors return `Option` instead;
//! only operations that *act* on a VID report [`RegistryError::NotFound`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use scene_registry::errors::{RegistryError, Result};
//!
//! fn remove(world: &mut World, vid: Vid) -> Result<()> {
//!     match world.remove_component(vid, false) {
//!         Err(RegistryError::SystemOwned(_)) => Ok(()),
//!         other => other,
//!     }
//! }
//! ```

use thiserror::Error;

use crate::core::{ComponentKind, Vid};

/// The main error type for the registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// The VID is not registered (or its entity is no longer alive).
    #[error("VID {0} is not registered")]
    NotFound(Vid),

    /// The VID is registered, but as a different kind of component.
    #[error("VID {vid} is a {actual:?}, expected {expected:?}")]
    KindMismatch {
        /// The offending VID
        vid: Vid,
        /// What the operation required
        expected: ComponentKind,
        /// What the VID actually is
        actual: ComponentKind,
    },

    /// A caller-supplied entity is not alive in the entity allocator.
    #[error("entity {0} is not alive")]
    EntityNotAlive(Vid),

    /// A caller-supplied entity already carries a name or a registered record.
    #[error("entity {0} is already registered")]
    AlreadyRegistered(Vid),

    // ========================================================================
    // Ownership Errors
    // ========================================================================
    /// The resource is a built-in system resource.
    #[error("VID {0} is a system resource and cannot be removed without force")]
    SystemOwned(Vid),

    /// The resource belongs to a loaded asset.
    #[error("VID {vid} is owned by asset {owner} and cannot be removed without force")]
    AssetOwned {
        /// The protected resource
        vid: Vid,
        /// The asset that owns it
        owner: Vid,
    },

    /// Scenes cannot be handed over to an asset.
    #[error("{kind:?} {vid} cannot be adopted into an asset")]
    NotAdoptable {
        /// The rejected VID
        vid: Vid,
        /// Its component kind
        kind: ComponentKind,
    },

    /// Adopting an asset into `asset` would make the two own each other.
    #[error("asset {vid} already owns asset {asset}, directly or indirectly")]
    OwnershipCycle {
        /// The asset being adopted
        vid: Vid,
        /// The would-be owner
        asset: Vid,
    },

    /// An actor material slot beyond the supported slot count.
    #[error("material slot {slot} of actor {actor} is out of range (max: {max})")]
    SlotOutOfRange {
        /// The actor being edited
        actor: Vid,
        /// The requested slot
        slot: usize,
        /// Number of supported slots
        max: usize,
    },

    // ========================================================================
    // Scene Graph Errors
    // ========================================================================
    /// `append_scene_entity_to_parent` was called with `src == dst`.
    #[error("cannot append VID {0} to itself")]
    SelfAppend(Vid),

    /// The requested reparenting would make a node its own ancestor.
    #[error("appending {child} under {parent} would create a hierarchy cycle")]
    HierarchyCycle {
        /// The node being moved
        child: Vid,
        /// The requested parent
        parent: Vid,
    },

    // ========================================================================
    // Allocation & Loading Errors
    // ========================================================================
    /// The entity allocator ran out of slots.
    #[error("entity allocator exhausted (capacity: {capacity})")]
    EntityLimit {
        /// Configured capacity
        capacity: u32,
    },

    /// Loader output references an index that does not exist.
    #[error("invalid asset prefab: {context} (index: {index})")]
    InvalidPrefab {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    // ========================================================================
    // Internal Errors
    // ========================================================================
    /// An internal bookkeeping invariant does not hold.
    #[error("registry invariant violated: {0}")]
    InvariantViolation(String),

    /// Settings could not be parsed.
    #[error("settings parse error: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Alias for `Result<T, RegistryError>`.
pub type Result<T> = std::result::Result<T, RegistryError>;
