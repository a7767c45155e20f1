#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Retained-mode scene resource registry.
//!
//! A [`World`] maps opaque [`Vid`]s to typed resource records (scenes,
//! cameras, lights, actors, geometries, materials, textures, fonts,
//! skeletons, assets, render paths), keeps track of which scene holds each
//! scene component, reparents entities and scenes, and tears resources down
//! with cascading, ownership-aware cleanup.

pub mod assets;
pub mod core;
pub mod errors;
pub mod native;
pub mod records;
pub mod settings;
pub mod world;
pub mod wrapper;

pub use assets::AssetPrefab;
pub use crate::core::{Component, ComponentKind, INVALID_VID, Vid};
pub use errors::{RegistryError, Result};
pub use records::{
    ActorVariant, AssetHandle, LightKind, Ownership, Projection, ShadingModel, SpriteParams,
    TextParams, TextureFormat,
};
pub use settings::RegistrySettings;
pub use world::{PrimitiveDesc, SystemResources, World};
pub use wrapper::{ActorMut, CameraMut, LightMut, MaterialInstanceMut, NodeMut};
