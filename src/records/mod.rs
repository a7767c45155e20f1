//! Resource Records
//!
//! One record type per component kind. A record holds the native engine keys
//! of its object plus, for renderer data, the [`Ownership`] metadata that the
//! destruction cascade checks before it erases anything.
//!
//! Native keys in records are weak relations: two records may point at the
//! same native object (duplicate registration), so a native object is only
//! destroyed once no record refers to it any more.

pub mod asset;
pub mod resource;
pub mod scene;

pub use asset::{AssetRecord, RenderPathRecord, RenderTarget};
pub use resource::{
    Aabb, FontRecord, GeometryRecord, MaterialInstanceRecord, MaterialRecord, ParamValue,
    Primitive, PrimitiveTopology, ShadingModel, SkeletonRecord, TextureFormat, TextureRecord,
};
pub use scene::{
    ActorRecord, ActorVariant, CameraRecord, LightKind, LightRecord, MAX_MATERIAL_SLOTS,
    Projection, SceneRecord, SpriteParams, TextParams,
};

use slotmap::new_key_type;

new_key_type! {
    /// Identity of a loaded asset, stored in the records it owns.
    pub struct AssetHandle;
}

/// Who, besides the client, has a say in a resource's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ownership {
    /// Built-in engine resource; only a forced removal may destroy it.
    pub is_system: bool,
    /// Set when the resource was created while loading an asset.
    pub asset_owner: Option<AssetHandle>,
}

impl Ownership {
    /// Plain client-owned resource.
    pub const USER: Self = Self {
        is_system: false,
        asset_owner: None,
    };

    /// Built-in resource created at bring-up.
    pub const SYSTEM: Self = Self {
        is_system: true,
        asset_owner: None,
    };

    #[must_use]
    pub fn owned_by(asset: AssetHandle) -> Self {
        Self {
            is_system: false,
            asset_owner: Some(asset),
        }
    }

    /// `true` if an unforced removal must be rejected.
    #[inline]
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.is_system || self.asset_owner.is_some()
    }
}
