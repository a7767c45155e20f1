//! Invariant checking.
//!
//! [`World::check_consistency`] walks every index and reports the first
//! broken invariant. It is meant for tests and debug assertions; nothing in
//! the registry calls it on a hot path.

use crate::core::{ComponentKind, Vid};
use crate::errors::{RegistryError, Result};
use crate::native::NativeComponent;
use crate::world::World;

fn violation(message: String) -> RegistryError {
    log::error!("Registry invariant violated: {message}");
    RegistryError::InvariantViolation(message)
}

impl World {
    /// Verifies that wrappers, records, native components, membership
    /// entries, actor references, asset ownership and texture
    /// back-references all agree.
    pub fn check_consistency(&self) -> Result<()> {
        self.check_wrappers()?;
        self.check_native_components()?;
        self.check_membership()?;
        self.check_actor_references()?;
        self.check_asset_ownership()?;
        self.check_texture_bindings()?;
        Ok(())
    }

    /// Kinds a record map may be keyed by, per map.
    fn record_kinds(&self, vid: Vid) -> Vec<(&'static str, bool)> {
        let kind = self.kind(vid);
        let is = |k: ComponentKind| kind == Some(k);
        let is_actor = kind.is_some_and(ComponentKind::is_actor);
        let mut out = Vec::new();
        let mut check = |map: &'static str, present: bool, ok: bool| {
            if present {
                out.push((map, ok));
            }
        };
        check("scene", self.scenes.contains_key(&vid), is(ComponentKind::Scene));
        check("camera", self.cameras.contains_key(&vid), is(ComponentKind::Camera));
        check("actor", self.actors.contains_key(&vid), is_actor);
        check("light", self.lights.contains_key(&vid), is(ComponentKind::Light));
        check("geometry", self.geometries.contains_key(&vid), is(ComponentKind::Geometry));
        check("material", self.materials.contains_key(&vid), is(ComponentKind::Material));
        check(
            "material instance",
            self.material_instances.contains_key(&vid),
            is(ComponentKind::MaterialInstance),
        );
        check("texture", self.textures.contains_key(&vid), is(ComponentKind::Texture));
        check("font", self.fonts.contains_key(&vid), is(ComponentKind::Font));
        check("skeleton", self.skeletons.contains_key(&vid), is(ComponentKind::Skeleton));
        check("asset", self.assets.contains_key(&vid), is(ComponentKind::Asset));
        check(
            "render path",
            self.render_paths.contains_key(&vid),
            is(ComponentKind::RenderPath) || is(ComponentKind::Renderer),
        );
        out
    }

    fn check_wrappers(&self) -> Result<()> {
        let record_keys = self
            .scenes
            .keys()
            .chain(self.cameras.keys())
            .chain(self.actors.keys())
            .chain(self.lights.keys())
            .chain(self.geometries.keys())
            .chain(self.materials.keys())
            .chain(self.material_instances.keys())
            .chain(self.textures.keys())
            .chain(self.fonts.keys())
            .chain(self.skeletons.keys())
            .chain(self.assets.keys())
            .chain(self.render_paths.keys());

        for &vid in record_keys {
            for (map, ok) in self.record_kinds(vid) {
                if !ok {
                    return Err(violation(format!(
                        "{vid:?} has a {map} record but its wrapper kind is {:?}",
                        self.kind(vid)
                    )));
                }
            }
        }

        for (&vid, component) in &self.components {
            if component.vid() != vid {
                return Err(violation(format!(
                    "wrapper stored under {vid:?} names {:?}",
                    component.vid()
                )));
            }
            if !self.engine.is_alive(vid) {
                return Err(violation(format!("wrapper {vid:?} has no live entity")));
            }
            if self.record_kinds(vid).is_empty() {
                return Err(violation(format!(
                    "{} wrapper {vid:?} has no record",
                    component.kind().as_str()
                )));
            }
        }
        Ok(())
    }

    fn check_native_components(&self) -> Result<()> {
        const ALL: [NativeComponent; 3] = [
            NativeComponent::Renderable,
            NativeComponent::Light,
            NativeComponent::Camera,
        ];
        for (&vid, component) in &self.components {
            let expected = match component.kind() {
                ComponentKind::Camera => Some(NativeComponent::Camera),
                ComponentKind::Light => Some(NativeComponent::Light),
                k if k.is_actor() => Some(NativeComponent::Renderable),
                _ => None,
            };
            for native in ALL {
                if self.engine.has_component(vid, native) != (expected == Some(native)) {
                    return Err(violation(format!(
                        "{} {vid:?} disagrees with its native {native:?} component",
                        component.kind().as_str()
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_membership(&self) -> Result<()> {
        let maps = [
            ("actor", &self.actor_scene),
            ("light", &self.light_scene),
            ("camera", &self.camera_scene),
        ];
        for (label, map) in maps {
            for (&vid, &scene) in map {
                let expected = match self.kind(vid) {
                    Some(ComponentKind::Camera) => "camera",
                    Some(ComponentKind::Light) => "light",
                    Some(k) if k.is_actor() => "actor",
                    _ => {
                        return Err(violation(format!(
                            "{vid:?} in the {label} membership map is not a scene component"
                        )));
                    }
                };
                if expected != label {
                    return Err(violation(format!(
                        "{vid:?} is a {expected} but sits in the {label} membership map"
                    )));
                }
                if !scene.is_valid() {
                    continue;
                }
                let Some(native) = self.native_scene(scene) else {
                    return Err(violation(format!(
                        "{vid:?} is a member of {scene:?}, which is not a live scene"
                    )));
                };
                if !native.has_entity(vid) {
                    return Err(violation(format!(
                        "{vid:?} is a member of {scene:?} but not in its scene object"
                    )));
                }
            }
        }

        for vid in self.actor_scene.keys() {
            if self.light_scene.contains_key(vid) || self.camera_scene.contains_key(vid) {
                return Err(violation(format!("{vid:?} appears in two membership maps")));
            }
        }
        for vid in self.light_scene.keys() {
            if self.camera_scene.contains_key(vid) {
                return Err(violation(format!("{vid:?} appears in two membership maps")));
            }
        }
        Ok(())
    }

    fn check_actor_references(&self) -> Result<()> {
        for (&actor_vid, actor) in &self.actors {
            if let Some(dangling) = actor
                .references()
                .find(|vid| !self.components.contains_key(vid))
            {
                return Err(violation(format!(
                    "actor {actor_vid:?} refers to {dangling:?}, which is not registered"
                )));
            }
        }
        Ok(())
    }

    fn check_asset_ownership(&self) -> Result<()> {
        for (&asset_vid, asset) in &self.assets {
            if self.asset_vid(asset.handle) != asset_vid {
                return Err(violation(format!(
                    "asset {asset_vid:?} does not own its handle"
                )));
            }
            for &owned in &asset.ownership {
                if !self.engine.is_alive(owned) {
                    return Err(violation(format!(
                        "asset {asset_vid:?} owns {owned:?}, which is gone"
                    )));
                }
                if let Some(ownership) = self.ownership(owned)
                    && ownership.asset_owner != Some(asset.handle)
                {
                    return Err(violation(format!(
                        "{owned:?} is in the set of asset {asset_vid:?} but records another owner"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_texture_bindings(&self) -> Result<()> {
        for (&mi_vid, mi) in &self.material_instances {
            if !self.materials.contains_key(&mi.material) {
                return Err(violation(format!(
                    "material instance {mi_vid:?} refers to missing material {:?}",
                    mi.material
                )));
            }
            for (param, texture) in &mi.textures {
                let Some(record) = self.textures.get(texture) else {
                    return Err(violation(format!(
                        "material instance {mi_vid:?} binds missing texture {texture:?} to '{param}'"
                    )));
                };
                if !record.assigned_mis.contains(&mi_vid) {
                    return Err(violation(format!(
                        "texture {texture:?} does not list material instance {mi_vid:?}"
                    )));
                }
            }
        }
        for (&texture_vid, texture) in &self.textures {
            for mi in &texture.assigned_mis {
                let binds = self
                    .material_instances
                    .get(mi)
                    .is_some_and(|r| r.textures.values().any(|&t| t == texture_vid));
                if !binds {
                    return Err(violation(format!(
                        "texture {texture_vid:?} lists {mi:?}, which does not bind it"
                    )));
                }
            }
        }
        Ok(())
    }
}
