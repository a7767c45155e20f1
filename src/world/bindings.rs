//! Cross-record references.
//!
//! Actors point at geometries, material instances and skeletons; material
//! instances point at textures and textures keep the reverse set of
//! material instances that bind them. These setters keep both directions in
//! sync and bump the timestamps of every record they touch.

use crate::core::{ComponentKind, INVALID_VID, Vid};
use crate::errors::{RegistryError, Result};
use crate::records::MAX_MATERIAL_SLOTS;
use crate::world::World;

impl World {
    /// Binds `texture` to the parameter `param` of a material instance.
    /// Passing `INVALID_VID` clears the parameter.
    pub fn bind_texture(&mut self, material_instance: Vid, param: &str, texture: Vid) -> Result<()> {
        self.expect_kind(material_instance, ComponentKind::MaterialInstance)?;
        if texture.is_valid() {
            self.expect_kind(texture, ComponentKind::Texture)?;
        }

        let Some(mi) = self.material_instances.get_mut(&material_instance) else {
            return Err(RegistryError::InvariantViolation(format!(
                "material instance {material_instance:?} has a wrapper but no record"
            )));
        };
        let previous = if texture.is_valid() {
            mi.textures.insert(param.to_string(), texture)
        } else {
            mi.textures.remove(param)
        };
        // The same texture may sit in several parameters of one instance.
        let previous_still_bound =
            previous.is_some_and(|p| mi.textures.values().any(|&bound| bound == p));

        if let Some(prev) = previous
            && prev != texture
            && !previous_still_bound
            && let Some(record) = self.textures.get_mut(&prev)
        {
            record.assigned_mis.remove(&material_instance);
        }
        if let Some(record) = self.textures.get_mut(&texture) {
            record.assigned_mis.insert(material_instance);
        }

        self.touch(material_instance);
        if let Some(prev) = previous {
            self.touch(prev);
        }
        if texture.is_valid() {
            self.touch(texture);
        }
        Ok(())
    }

    /// Texture bound to `param`, or `INVALID_VID`.
    #[must_use]
    pub fn bound_texture(&self, material_instance: Vid, param: &str) -> Vid {
        self.material_instances
            .get(&material_instance)
            .and_then(|mi| mi.textures.get(param).copied())
            .unwrap_or(INVALID_VID)
    }

    pub fn set_actor_geometry(&mut self, actor: Vid, geometry: Vid) -> Result<()> {
        if geometry.is_valid() {
            self.expect_kind(geometry, ComponentKind::Geometry)?;
        }
        let record = self
            .actors
            .get_mut(&actor)
            .ok_or(RegistryError::NotFound(actor))?;
        record.geometry = geometry;
        self.touch(actor);
        Ok(())
    }

    /// Sets material slot `slot`, growing the slot list with
    /// `INVALID_VID` as needed. Slots at or past [`MAX_MATERIAL_SLOTS`] are
    /// rejected.
    pub fn set_actor_material_instance(
        &mut self,
        actor: Vid,
        slot: usize,
        material_instance: Vid,
    ) -> Result<()> {
        if slot >= MAX_MATERIAL_SLOTS {
            return Err(RegistryError::SlotOutOfRange {
                actor,
                slot,
                max: MAX_MATERIAL_SLOTS,
            });
        }
        if material_instance.is_valid() {
            self.expect_kind(material_instance, ComponentKind::MaterialInstance)?;
        }
        let record = self
            .actors
            .get_mut(&actor)
            .ok_or(RegistryError::NotFound(actor))?;
        if record.material_instances.len() <= slot {
            record.material_instances.resize(slot + 1, INVALID_VID);
        }
        record.material_instances[slot] = material_instance;
        self.touch(actor);
        Ok(())
    }

    /// Material instance in slot `slot`, `INVALID_VID` if empty or absent.
    #[must_use]
    pub fn actor_material_instance(&self, actor: Vid, slot: usize) -> Vid {
        self.actors
            .get(&actor)
            .and_then(|a| a.material_instances.get(slot).copied())
            .unwrap_or(INVALID_VID)
    }

    pub fn set_actor_skeleton(&mut self, actor: Vid, skeleton: Vid) -> Result<()> {
        if skeleton.is_valid() {
            self.expect_kind(skeleton, ComponentKind::Skeleton)?;
        }
        let record = self
            .actors
            .get_mut(&actor)
            .ok_or(RegistryError::NotFound(actor))?;
        record.skeleton = skeleton;
        self.touch(actor);
        Ok(())
    }

    pub fn set_render_path_camera(&mut self, render_path: Vid, camera: Vid) -> Result<()> {
        if camera.is_valid() {
            self.expect_kind(camera, ComponentKind::Camera)?;
        }
        let record = self
            .render_paths
            .get_mut(&render_path)
            .ok_or(RegistryError::NotFound(render_path))?;
        record.camera = camera;
        self.touch(render_path);
        Ok(())
    }
}
