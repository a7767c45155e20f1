//! Native engine layer
//!
//! The low-level managers the registry drives:
//! - EntityManager: VID allocation with generation checks
//! - TransformManager: parent/child forest with TRS transforms
//! - NameComponentManager: interned entity names
//! - NativeScene: flat entity lists that get rendered
//! - NativeResources: GPU-side materials, textures, buffers and fonts
//!
//! The registry never reaches into these directly from client code; it keeps
//! them consistent with its own records.

pub mod entity;
pub mod names;
pub mod resources;
pub mod scene;
pub mod transform;

pub use entity::EntityManager;
pub use names::NameComponentManager;
pub use resources::{
    BufferUsage, NativeBufferKey, NativeFontKey, NativeMaterialInstanceKey, NativeMaterialKey,
    NativeResources, NativeTextureKey,
};
pub use scene::{NativeScene, NativeSceneKey};
pub use transform::{Transform, TransformManager, TransformNode};

use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::core::Vid;

/// Which engine-side component a scene entity carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeComponent {
    Renderable,
    Light,
    Camera,
}

#[derive(Debug)]
pub struct NativeEngine {
    pub entities: EntityManager,
    pub transforms: TransformManager,
    pub names: NameComponentManager,
    pub resources: NativeResources,
    scenes: SlotMap<NativeSceneKey, NativeScene>,
    renderables: FxHashSet<Vid>,
    lights: FxHashSet<Vid>,
    cameras: FxHashSet<Vid>,
}

impl NativeEngine {
    #[must_use]
    pub fn new(entity_capacity: u32) -> Self {
        Self {
            entities: EntityManager::new(entity_capacity),
            transforms: TransformManager::new(),
            names: NameComponentManager::new(),
            resources: NativeResources::new(),
            scenes: SlotMap::with_key(),
            renderables: FxHashSet::default(),
            lights: FxHashSet::default(),
            cameras: FxHashSet::default(),
        }
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn add_component(&mut self, vid: Vid, component: NativeComponent) {
        match component {
            NativeComponent::Renderable => self.renderables.insert(vid),
            NativeComponent::Light => self.lights.insert(vid),
            NativeComponent::Camera => self.cameras.insert(vid),
        };
    }

    #[must_use]
    pub fn has_component(&self, vid: Vid, component: NativeComponent) -> bool {
        match component {
            NativeComponent::Renderable => self.renderables.contains(&vid),
            NativeComponent::Light => self.lights.contains(&vid),
            NativeComponent::Camera => self.cameras.contains(&vid),
        }
    }

    // ========================================================================
    // Scenes
    // ========================================================================

    pub fn create_scene(&mut self) -> NativeSceneKey {
        self.scenes.insert(NativeScene::new())
    }

    #[must_use]
    pub fn scene(&self, key: NativeSceneKey) -> Option<&NativeScene> {
        self.scenes.get(key)
    }

    pub fn scene_mut(&mut self, key: NativeSceneKey) -> Option<&mut NativeScene> {
        self.scenes.get_mut(key)
    }

    pub fn destroy_scene(&mut self, key: NativeSceneKey) -> Option<NativeScene> {
        self.scenes.remove(key)
    }

    /// Removes `vid` from every scene object. Returns how many held it.
    pub fn remove_from_all_scenes(&mut self, vid: Vid) -> usize {
        self.scenes
            .values_mut()
            .map(|scene| usize::from(scene.remove(vid)))
            .sum()
    }

    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    // ========================================================================
    // Entities
    // ========================================================================

    /// Destroys the entity together with every per-entity component.
    ///
    /// Children of its transform node become roots.
    pub fn destroy_entity(&mut self, vid: Vid) -> bool {
        self.transforms.destroy(vid);
        self.names.remove_entity(vid);
        self.renderables.remove(&vid);
        self.lights.remove(&vid);
        self.cameras.remove(&vid);
        self.entities.destroy(vid)
    }

    #[inline]
    #[must_use]
    pub fn is_alive(&self, vid: Vid) -> bool {
        self.entities.is_alive(vid)
    }
}
