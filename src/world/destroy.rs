//! Destruction cascade.
//!
//! Removing a component removes everything that cannot outlive it: a
//! material takes its instances along, a camera its helper geometry, an
//! asset its whole ownership set. References that merely point at a removed
//! resource (actor slots, texture bindings, render path cameras) are reset
//! instead.
//!
//! Ownership is checked before anything is touched. A rejected removal
//! returns an error and leaves the world exactly as it was.

use bitflags::bitflags;

use crate::core::{ComponentKind, INVALID_VID, Vid};
use crate::errors::{RegistryError, Result};
use crate::native::{NativeFontKey, NativeMaterialInstanceKey, NativeMaterialKey, NativeTextureKey};
use crate::records::{ActorVariant, Ownership};
use crate::world::{SystemResources, World};

bitflags! {
    /// Resource kinds erased by one step of the cascade.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    struct RemovedKinds: u8 {
        const TEXTURE           = 1 << 0;
        const MATERIAL          = 1 << 1;
        const MATERIAL_INSTANCE = 1 << 2;
        const GEOMETRY          = 1 << 3;
        const FONT              = 1 << 4;
        const SKELETON          = 1 << 5;
    }
}

impl World {
    /// Removes the component `vid` and everything it owns.
    ///
    /// System resources and resources owned by an asset are only removed
    /// when `force` is set. Scenes are forwarded to
    /// [`remove_scene`](Self::remove_scene). A bare node (a bone) may be
    /// removed too; it only has a name and a transform.
    pub fn remove_component(&mut self, vid: Vid, force: bool) -> Result<()> {
        if self.scenes.contains_key(&vid) {
            return self.remove_scene(vid);
        }

        if !self.components.contains_key(&vid) {
            if self.has_any_record(vid) {
                log::error!("{vid:?} has a resource record but no component wrapper");
                return Err(RegistryError::InvariantViolation(format!(
                    "{vid:?} has a resource record but no component wrapper"
                )));
            }
            if !self.engine.is_alive(vid) {
                return Err(RegistryError::NotFound(vid));
            }
        }

        if !force {
            self.check_removal_allowed(vid)?;
        }

        let kind = self.kind(vid);
        let mut removed = RemovedKinds::empty();

        // ---- Texture ----
        if let Some(texture) = self.textures.remove(&vid) {
            let holders: Vec<Vid> = self
                .material_instances
                .iter_mut()
                .filter_map(|(&mi, record)| (record.strip_texture(vid) > 0).then_some(mi))
                .collect();
            for mi in holders {
                self.touch(mi);
            }
            self.release_native_texture(texture.native);
            removed |= RemovedKinds::TEXTURE;
        }

        // ---- Material (and every instance created from it) ----
        if self.materials.contains_key(&vid) {
            let mut dependents: Vec<Vid> = self
                .material_instances
                .iter()
                .filter(|(_, mi)| mi.material == vid)
                .map(|(&mi, _)| mi)
                .collect();
            dependents.sort_unstable();
            for mi in dependents {
                log::debug!("Removing material instance {mi:?} of material {vid:?}");
                self.remove_component(mi, true)?;
            }
            if let Some(material) = self.materials.remove(&vid) {
                self.release_native_material(material.native);
            }
            removed |= RemovedKinds::MATERIAL;
        }

        // ---- Material instance ----
        if let Some(mi) = self.material_instances.remove(&vid) {
            let bound: Vec<Vid> = self
                .textures
                .iter_mut()
                .filter_map(|(&texture, record)| record.assigned_mis.remove(&vid).then_some(texture))
                .collect();
            for texture in bound {
                self.touch(texture);
            }
            self.release_native_material_instance(mi.native);
            removed |= RemovedKinds::MATERIAL_INSTANCE;
        }

        // ---- Geometry ----
        if let Some(geometry) = self.geometries.remove(&vid) {
            for primitive in &geometry.primitives {
                self.engine.resources.buffers.remove(primitive.vertex_buffer);
                if let Some(index_buffer) = primitive.index_buffer {
                    self.engine.resources.buffers.remove(index_buffer);
                }
            }
            removed |= RemovedKinds::GEOMETRY;
        }

        // ---- Font ----
        if let Some(font) = self.fonts.remove(&vid) {
            self.release_native_font(font.native);
            removed |= RemovedKinds::FONT;
        }

        if self.skeletons.remove(&vid).is_some() {
            removed |= RemovedKinds::SKELETON;
        }

        if !removed.is_empty() {
            self.reset_dangling_references(removed);
        }

        // ---- Camera ----
        if let Some(camera) = self.cameras.remove(&vid) {
            let helper = camera.helper_geometry;
            if helper.is_valid() && self.geometries.contains_key(&helper) {
                self.remove_component(helper, true)?;
            }
            let paths: Vec<Vid> = self
                .render_paths
                .iter_mut()
                .filter(|(_, path)| path.camera == vid)
                .map(|(&path_vid, path)| {
                    path.camera = INVALID_VID;
                    path_vid
                })
                .collect();
            for path in paths {
                self.touch(path);
            }
        }

        self.lights.remove(&vid);
        self.actors.remove(&vid);

        // ---- Asset ----
        let owned: Option<Vec<Vid>> = self
            .assets
            .get(&vid)
            .map(|a| a.ownership.iter().copied().collect());
        if let Some(owned) = owned {
            for child in owned {
                if !self.engine.is_alive(child) {
                    log::debug!("Asset {vid:?}: {child:?} already removed");
                    continue;
                }
                self.remove_component(child, true)?;
            }
            if let Some(asset) = self.assets.remove(&vid) {
                self.asset_handles.remove(asset.handle);
                log::info!("Released asset '{}'", asset.source);
            }
        }

        self.erase_everywhere(vid);

        match kind {
            Some(kind) => log::debug!("Removed {} {vid:?}", kind.as_str()),
            None => log::debug!("Removed node {vid:?}"),
        }
        Ok(())
    }

    /// Destroys a scene object. Its contents survive and are simply no
    /// longer placed in any scene.
    pub fn remove_scene(&mut self, vid: Vid) -> Result<()> {
        let Some(record) = self.scenes.get(&vid) else {
            return match self.kind(vid) {
                Some(actual) => Err(RegistryError::KindMismatch {
                    vid,
                    expected: ComponentKind::Scene,
                    actual,
                }),
                None => Err(RegistryError::NotFound(vid)),
            };
        };
        let native = record.native;

        for entity in self.scene_entities(vid) {
            if self.scene_of(entity) == vid {
                self.reset_membership(entity);
            }
        }
        // Components whose entry names the scene without being in it.
        for member in self.scene_members(vid) {
            self.reset_membership(member);
        }

        self.engine.destroy_scene(native);
        self.scenes.remove(&vid);
        if !self.components.contains_key(&vid) {
            log::error!("Scene {vid:?} had no component wrapper");
        }
        self.components.remove(&vid);
        self.engine.destroy_entity(vid);
        log::debug!("Removed scene {vid:?}");
        Ok(())
    }

    /// Shutdown path: force-removes every asset, then every remaining
    /// component including the system resources.
    pub fn release_all(&mut self) -> Result<()> {
        let bones: Vec<Vid> = self
            .skeletons
            .values()
            .flat_map(|s| s.bones.keys().copied())
            .collect();

        for asset in self.vids_of_kind(ComponentKind::Asset) {
            if self.assets.contains_key(&asset) {
                self.remove_component(asset, true)?;
            }
        }
        for scene in self.vids_of_kind(ComponentKind::Scene) {
            self.remove_scene(scene)?;
        }
        for vid in self.vids() {
            if self.components.contains_key(&vid) {
                self.remove_component(vid, true)?;
            }
        }
        for bone in bones {
            if self.engine.is_alive(bone) {
                self.remove_component(bone, true)?;
            }
        }

        self.system = SystemResources::default();
        log::info!("Scene registry released");
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn has_any_record(&self, vid: Vid) -> bool {
        self.cameras.contains_key(&vid)
            || self.actors.contains_key(&vid)
            || self.lights.contains_key(&vid)
            || self.geometries.contains_key(&vid)
            || self.materials.contains_key(&vid)
            || self.material_instances.contains_key(&vid)
            || self.textures.contains_key(&vid)
            || self.fonts.contains_key(&vid)
            || self.skeletons.contains_key(&vid)
            || self.assets.contains_key(&vid)
            || self.render_paths.contains_key(&vid)
    }

    fn check_removal_allowed(&self, vid: Vid) -> Result<()> {
        let records: [(&str, Option<Ownership>); 6] = [
            ("texture", self.textures.get(&vid).map(|r| r.ownership)),
            ("material", self.materials.get(&vid).map(|r| r.ownership)),
            (
                "material instance",
                self.material_instances.get(&vid).map(|r| r.ownership),
            ),
            ("geometry", self.geometries.get(&vid).map(|r| r.ownership)),
            ("font", self.fonts.get(&vid).map(|r| r.ownership)),
            ("skeleton", self.skeletons.get(&vid).map(|r| r.ownership)),
        ];

        for (label, ownership) in records {
            let Some(ownership) = ownership.filter(Ownership::is_protected) else {
                continue;
            };
            if ownership.is_system {
                log::warn!("Refusing to remove system {label} {vid:?} without force");
                return Err(RegistryError::SystemOwned(vid));
            }
            if let Some(handle) = ownership.asset_owner {
                let owner = self.asset_vid(handle);
                log::warn!(
                    "Refusing to remove {label} {vid:?}: owned by asset {owner:?} ('{}')",
                    self.name(owner).unwrap_or_default()
                );
                return Err(RegistryError::AssetOwned { vid, owner });
            }
        }

        let owner = self.get_asset_owner(vid);
        if owner.is_valid() {
            log::warn!(
                "Refusing to remove {vid:?}: owned by asset {owner:?} ('{}')",
                self.name(owner).unwrap_or_default()
            );
            return Err(RegistryError::AssetOwned { vid, owner });
        }
        Ok(())
    }

    /// Resets every actor and camera reference to a record that no longer
    /// exists.
    fn reset_dangling_references(&mut self, removed: RemovedKinds) {
        let mut changed = Vec::new();

        for (&actor_vid, actor) in &mut self.actors {
            let mut dirty = false;
            if removed.contains(RemovedKinds::GEOMETRY)
                && actor.geometry.is_valid()
                && !self.geometries.contains_key(&actor.geometry)
            {
                actor.geometry = INVALID_VID;
                dirty = true;
            }
            if removed.intersects(RemovedKinds::MATERIAL | RemovedKinds::MATERIAL_INSTANCE) {
                for slot in &mut actor.material_instances {
                    if slot.is_valid() && !self.material_instances.contains_key(&*slot) {
                        *slot = INVALID_VID;
                        dirty = true;
                    }
                }
            }
            if removed.contains(RemovedKinds::SKELETON)
                && actor.skeleton.is_valid()
                && !self.skeletons.contains_key(&actor.skeleton)
            {
                actor.skeleton = INVALID_VID;
                dirty = true;
            }
            match &mut actor.variant {
                ActorVariant::Sprite(sprite)
                    if removed.contains(RemovedKinds::TEXTURE)
                        && sprite.texture.is_valid()
                        && !self.textures.contains_key(&sprite.texture) =>
                {
                    sprite.texture = INVALID_VID;
                    dirty = true;
                }
                ActorVariant::Text(text)
                    if removed.contains(RemovedKinds::FONT)
                        && text.font.is_valid()
                        && !self.fonts.contains_key(&text.font) =>
                {
                    text.font = INVALID_VID;
                    dirty = true;
                }
                _ => {}
            }
            if dirty {
                changed.push(actor_vid);
            }
        }

        if removed.contains(RemovedKinds::GEOMETRY) {
            for (&camera_vid, camera) in &mut self.cameras {
                if camera.helper_geometry.is_valid()
                    && !self.geometries.contains_key(&camera.helper_geometry)
                {
                    camera.helper_geometry = INVALID_VID;
                    changed.push(camera_vid);
                }
            }
        }

        for vid in changed {
            log::debug!("Reset dangling references of {vid:?}");
            self.touch(vid);
        }
    }

    /// Drops `vid` from every index, scene, skeleton and asset, then
    /// destroys the native entity.
    fn erase_everywhere(&mut self, vid: Vid) {
        self.components.remove(&vid);
        self.erase_membership(vid);
        self.render_paths.remove(&vid);
        self.engine.remove_from_all_scenes(vid);

        for skeleton in self.skeletons.values_mut() {
            skeleton.bones.remove(&vid);
            if skeleton.root_bone == vid {
                skeleton.root_bone = INVALID_VID;
            }
        }
        for asset in self.assets.values_mut() {
            asset.ownership.remove(&vid);
            asset.root_vids.retain(|&root| root != vid);
        }

        self.engine.destroy_entity(vid);
    }

    // ---- Native release (only once no record refers to the object) ----

    fn release_native_texture(&mut self, native: NativeTextureKey) {
        if self.textures.values().any(|t| t.native == native) {
            log::debug!("Native texture still registered elsewhere, keeping it");
            return;
        }
        self.engine.resources.textures.remove(native);
    }

    fn release_native_material(&mut self, native: NativeMaterialKey) {
        if self.materials.values().any(|m| m.native == native) {
            log::debug!("Native material still registered elsewhere, keeping it");
            return;
        }
        self.engine.resources.materials.remove(native);
    }

    fn release_native_material_instance(&mut self, native: NativeMaterialInstanceKey) {
        if self.material_instances.values().any(|m| m.native == native) {
            log::debug!("Native material instance still registered elsewhere, keeping it");
            return;
        }
        self.engine.resources.material_instances.remove(native);
    }

    fn release_native_font(&mut self, native: NativeFontKey) {
        if self.fonts.values().any(|f| f.native == native) {
            return;
        }
        self.engine.resources.fonts.remove(native);
    }
}
