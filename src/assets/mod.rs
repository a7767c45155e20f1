//! Asset loading support.
//!
//! File parsing lives outside the registry. A loader produces an
//! [`AssetPrefab`] and [`World::instantiate_asset`](crate::World::instantiate_asset)
//! registers it, recording which components the new asset owns.

pub mod loader;
pub mod prefab;

pub use prefab::{
    AssetPrefab, PrefabGeometry, PrefabMaterial, PrefabMaterialInstance, PrefabNode,
    PrefabSkeleton, PrefabTexture,
};
