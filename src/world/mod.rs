//! The registry context.
//!
//! [`World`] owns the native engine, one record map per component kind, the
//! wrapper map and the three membership indices. Every operation goes
//! through it explicitly, so independent worlds (for example one per test)
//! never share state.
//!
//! The work is split by concern:
//! - `create`: the `create_*` factories and asset adoption
//! - `membership`: scene membership bookkeeping
//! - `graph`: the scene graph mutator
//! - `destroy`: the destruction cascade
//! - `consistency`: invariant checking
//!
//! Record references handed out by the getters borrow the world, so they
//! cannot be held across a structural mutation. VIDs themselves are
//! generation-checked and a stale VID simply stops resolving.

mod bindings;
mod consistency;
mod create;
mod destroy;
mod graph;
mod membership;

pub use create::PrimitiveDesc;

use std::time::Instant;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::core::{Component, ComponentKind, INVALID_VID, Vid};
use crate::errors::{RegistryError, Result};
use crate::native::{
    NativeEngine, NativeMaterialInstanceKey, NativeMaterialKey, NativeScene, NativeTextureKey,
    TransformNode,
};
use crate::records::{
    ActorRecord, AssetHandle, AssetRecord, CameraRecord, FontRecord, GeometryRecord, LightRecord,
    MaterialInstanceRecord, MaterialRecord, Ownership, RenderPathRecord, SceneRecord,
    SkeletonRecord, TextureRecord,
};
use crate::settings::RegistrySettings;

/// VIDs of the built-in resources created at bring-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemResources {
    pub material: Vid,
    pub material_instance: Vid,
    pub texture: Vid,
}

pub struct World {
    pub(crate) engine: NativeEngine,
    settings: RegistrySettings,
    system: SystemResources,

    // ==== Component wrappers ====
    pub(crate) components: FxHashMap<Vid, Component>,

    // ==== Resource records ====
    pub(crate) scenes: FxHashMap<Vid, SceneRecord>,
    pub(crate) cameras: FxHashMap<Vid, CameraRecord>,
    pub(crate) actors: FxHashMap<Vid, ActorRecord>,
    pub(crate) lights: FxHashMap<Vid, LightRecord>,
    pub(crate) geometries: FxHashMap<Vid, GeometryRecord>,
    pub(crate) materials: FxHashMap<Vid, MaterialRecord>,
    pub(crate) material_instances: FxHashMap<Vid, MaterialInstanceRecord>,
    pub(crate) textures: FxHashMap<Vid, TextureRecord>,
    pub(crate) fonts: FxHashMap<Vid, FontRecord>,
    pub(crate) skeletons: FxHashMap<Vid, SkeletonRecord>,
    pub(crate) assets: FxHashMap<Vid, AssetRecord>,
    pub(crate) render_paths: FxHashMap<Vid, RenderPathRecord>,

    // ==== Membership indices (component -> scene VID, 0 = none) ====
    pub(crate) actor_scene: FxHashMap<Vid, Vid>,
    pub(crate) light_scene: FxHashMap<Vid, Vid>,
    pub(crate) camera_scene: FxHashMap<Vid, Vid>,

    pub(crate) asset_handles: SlotMap<AssetHandle, Vid>,
}

impl World {
    /// Brings up an empty world and, if configured, its system resources.
    pub fn new(settings: RegistrySettings) -> Result<Self> {
        let mut world = Self {
            engine: NativeEngine::new(settings.entity_capacity),
            settings,
            system: SystemResources::default(),

            components: FxHashMap::default(),

            scenes: FxHashMap::default(),
            cameras: FxHashMap::default(),
            actors: FxHashMap::default(),
            lights: FxHashMap::default(),
            geometries: FxHashMap::default(),
            materials: FxHashMap::default(),
            material_instances: FxHashMap::default(),
            textures: FxHashMap::default(),
            fonts: FxHashMap::default(),
            skeletons: FxHashMap::default(),
            assets: FxHashMap::default(),
            render_paths: FxHashMap::default(),

            actor_scene: FxHashMap::default(),
            light_scene: FxHashMap::default(),
            camera_scene: FxHashMap::default(),

            asset_handles: SlotMap::with_key(),
        };

        if world.settings.create_system_resources {
            world.create_system_resources()?;
        }
        log::info!(
            "Scene registry ready (entity capacity: {})",
            world.settings.entity_capacity
        );
        Ok(world)
    }

    #[must_use]
    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    #[must_use]
    pub fn system_resources(&self) -> SystemResources {
        self.system
    }

    /// Read-only access to the native engine layer.
    #[must_use]
    pub fn engine(&self) -> &NativeEngine {
        &self.engine
    }

    // ========================================================================
    // Component wrappers
    // ========================================================================

    #[must_use]
    pub fn component(&self, vid: Vid) -> Option<&Component> {
        self.components.get(&vid)
    }

    #[must_use]
    pub fn kind(&self, vid: Vid) -> Option<ComponentKind> {
        self.components.get(&vid).map(Component::kind)
    }

    /// Time of the last mutation of `vid`.
    #[must_use]
    pub fn timestamp(&self, vid: Vid) -> Option<Instant> {
        self.components.get(&vid).map(Component::timestamp)
    }

    #[must_use]
    pub fn contains(&self, vid: Vid) -> bool {
        self.components.contains_key(&vid)
    }

    /// Registered VIDs in ascending order.
    #[must_use]
    pub fn vids(&self) -> Vec<Vid> {
        let mut out: Vec<Vid> = self.components.keys().copied().collect();
        out.sort_unstable();
        out
    }

    /// Registered VIDs of one kind, in ascending order.
    #[must_use]
    pub fn vids_of_kind(&self, kind: ComponentKind) -> Vec<Vid> {
        let mut out: Vec<Vid> = self
            .components
            .values()
            .filter(|c| c.kind() == kind)
            .map(Component::vid)
            .collect();
        out.sort_unstable();
        out
    }

    /// Number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub(crate) fn touch(&mut self, vid: Vid) {
        if let Some(component) = self.components.get_mut(&vid) {
            component.touch();
        }
    }

    pub(crate) fn expect_kind(&self, vid: Vid, expected: ComponentKind) -> Result<()> {
        match self.kind(vid) {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(RegistryError::KindMismatch {
                vid,
                expected,
                actual,
            }),
            None => Err(RegistryError::NotFound(vid)),
        }
    }

    // ========================================================================
    // Names
    // ========================================================================

    #[must_use]
    pub fn name(&self, vid: Vid) -> Option<&str> {
        self.engine.names.get_name(vid)
    }

    pub fn set_name(&mut self, vid: Vid, name: &str) -> Result<()> {
        if !self.engine.is_alive(vid) {
            return Err(RegistryError::NotFound(vid));
        }
        self.engine.names.set_name(vid, name);
        self.touch(vid);
        Ok(())
    }

    /// Every live entity named `name` (registered components and bones).
    #[must_use]
    pub fn find_vids_by_name(&self, name: &str) -> Vec<Vid> {
        self.engine.names.get_entities_by_name(name)
    }

    // ========================================================================
    // Reverse lookups
    // ========================================================================

    /// VID of the material registered for `native`, or `INVALID_VID`.
    #[must_use]
    pub fn find_material_vid(&self, native: NativeMaterialKey) -> Vid {
        self.materials
            .iter()
            .find(|(_, r)| r.native == native)
            .map_or(INVALID_VID, |(&vid, _)| vid)
    }

    #[must_use]
    pub fn find_material_instance_vid(&self, native: NativeMaterialInstanceKey) -> Vid {
        self.material_instances
            .iter()
            .find(|(_, r)| r.native == native)
            .map_or(INVALID_VID, |(&vid, _)| vid)
    }

    #[must_use]
    pub fn find_texture_vid(&self, native: NativeTextureKey) -> Vid {
        self.textures
            .iter()
            .find(|(_, r)| r.native == native)
            .map_or(INVALID_VID, |(&vid, _)| vid)
    }

    /// The asset whose ownership set contains `vid`, or `INVALID_VID`.
    #[must_use]
    pub fn get_asset_owner(&self, vid: Vid) -> Vid {
        self.assets
            .iter()
            .find(|(_, asset)| asset.ownership.contains(&vid))
            .map_or(INVALID_VID, |(&asset_vid, _)| asset_vid)
    }

    /// VID of the asset behind an ownership handle.
    #[must_use]
    pub fn asset_vid(&self, handle: AssetHandle) -> Vid {
        self.asset_handles
            .get(handle)
            .copied()
            .unwrap_or(INVALID_VID)
    }

    /// Ownership metadata of the resource record(s) behind `vid`.
    ///
    /// A VID may carry several records; the flags are merged.
    #[must_use]
    pub fn ownership(&self, vid: Vid) -> Option<Ownership> {
        let candidates = [
            self.textures.get(&vid).map(|r| r.ownership),
            self.materials.get(&vid).map(|r| r.ownership),
            self.material_instances.get(&vid).map(|r| r.ownership),
            self.geometries.get(&vid).map(|r| r.ownership),
            self.fonts.get(&vid).map(|r| r.ownership),
            self.skeletons.get(&vid).map(|r| r.ownership),
        ];
        candidates
            .into_iter()
            .flatten()
            .reduce(|a, b| Ownership {
                is_system: a.is_system || b.is_system,
                asset_owner: a.asset_owner.or(b.asset_owner),
            })
    }

    // ========================================================================
    // Native views
    // ========================================================================

    /// Transform node of a scene component or bone.
    #[must_use]
    pub fn transform(&self, vid: Vid) -> Option<&TransformNode> {
        self.engine.transforms.get(vid)
    }

    /// Transform parent of `vid`, `INVALID_VID` for roots and unknown VIDs.
    #[must_use]
    pub fn parent_of(&self, vid: Vid) -> Vid {
        self.engine.transforms.parent(vid).unwrap_or(INVALID_VID)
    }

    #[must_use]
    pub fn children_of(&self, vid: Vid) -> Vec<Vid> {
        self.engine.transforms.children(vid).to_vec()
    }

    /// The native scene object behind a scene VID.
    #[must_use]
    pub fn native_scene(&self, scene: Vid) -> Option<&NativeScene> {
        let record = self.scenes.get(&scene)?;
        self.engine.scene(record.native)
    }

    /// Recomputes world matrices of the whole transform forest.
    pub fn update_transforms(&mut self) {
        self.engine.transforms.update_world_matrices();
    }
}

// ============================================================================
// Record accessors
// ============================================================================

macro_rules! record_accessors {
    ($( $map:ident : $record:ty => $get:ident $(, $get_mut:ident)?; )*) => {
        impl World {
            $(
                #[must_use]
                pub fn $get(&self, vid: Vid) -> Option<&$record> {
                    self.$map.get(&vid)
                }

                $(
                    /// Mutable record access; bumps the component timestamp.
                    pub(crate) fn $get_mut(&mut self, vid: Vid) -> Option<&mut $record> {
                        let record = self.$map.get_mut(&vid)?;
                        if let Some(component) = self.components.get_mut(&vid) {
                            component.touch();
                        }
                        Some(record)
                    }
                )?
            )*
        }
    };
}

record_accessors! {
    scenes: SceneRecord => get_scene_res;
    cameras: CameraRecord => get_camera_res, get_camera_res_mut;
    actors: ActorRecord => get_actor_res, get_actor_res_mut;
    lights: LightRecord => get_light_res, get_light_res_mut;
    geometries: GeometryRecord => get_geometry_res;
    materials: MaterialRecord => get_material_res;
    material_instances: MaterialInstanceRecord => get_material_instance_res, get_material_instance_res_mut;
    textures: TextureRecord => get_texture_res;
    fonts: FontRecord => get_font_res;
    skeletons: SkeletonRecord => get_skeleton_res;
    assets: AssetRecord => get_asset_res;
    render_paths: RenderPathRecord => get_render_path_res;
}
