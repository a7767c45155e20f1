//! Chainable component mutation views.
//!
//! [`NodeMut`], [`ActorMut`], [`LightMut`], [`CameraMut`] and
//! [`MaterialInstanceMut`] borrow the [`World`] mutably and expose a fluent
//! setter API. Every setter bumps the component timestamp.
//!
//! All methods silently no-op when the VID is stale, so a dangling VID never
//! panics.
//!
//! # Example
//!
//! ```rust,ignore
//! world.node(actor)
//!     .set_position(0.0, 3.0, 0.0)
//!     .set_scale(2.0);
//! world.actor(actor)
//!     .set_material_instance(1, mi)
//!     .set_cast_shadow(false);
//! ```
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]
use glam::{EulerRot, Quat, Vec3, Vec4};

use crate::core::Vid;
use crate::native::Transform;
use crate::records::{LightKind, ParamValue, Projection};
use crate::world::World;

impl World {
    /// Transform view of any node (scene component or bone).
    #[inline]
    pub fn node(&mut self, vid: Vid) -> NodeMut<'_> {
        NodeMut { world: self, vid }
    }

    #[inline]
    pub fn actor(&mut self, vid: Vid) -> ActorMut<'_> {
        ActorMut { world: self, vid }
    }

    #[inline]
    pub fn light(&mut self, vid: Vid) -> LightMut<'_> {
        LightMut { world: self, vid }
    }

    #[inline]
    pub fn camera(&mut self, vid: Vid) -> CameraMut<'_> {
        CameraMut { world: self, vid }
    }

    #[inline]
    pub fn material_instance(&mut self, vid: Vid) -> MaterialInstanceMut<'_> {
        MaterialInstanceMut { world: self, vid }
    }
}

// ============================================================================
// Node (transform)
// ============================================================================

pub struct NodeMut<'a> {
    world: &'a mut World,
    vid: Vid,
}

impl NodeMut<'_> {
    #[inline]
    #[must_use]
    pub fn vid(&self) -> Vid {
        self.vid
    }

    fn edit(self, f: impl FnOnce(&mut Transform)) -> Self {
        if let Some(node) = self.world.engine.transforms.get_mut(self.vid) {
            f(&mut node.transform);
            self.world.touch(self.vid);
        }
        self
    }

    #[inline]
    pub fn set_position(self, x: f32, y: f32, z: f32) -> Self {
        self.edit(|t| t.position = Vec3::new(x, y, z))
    }

    #[inline]
    pub fn set_position_vec(self, position: Vec3) -> Self {
        self.edit(|t| t.position = position)
    }

    /// Sets uniform scale.
    #[inline]
    pub fn set_scale(self, s: f32) -> Self {
        self.edit(|t| t.scale = Vec3::splat(s))
    }

    #[inline]
    pub fn set_scale_xyz(self, x: f32, y: f32, z: f32) -> Self {
        self.edit(|t| t.scale = Vec3::new(x, y, z))
    }

    #[inline]
    pub fn set_rotation(self, rotation: Quat) -> Self {
        self.edit(|t| t.rotation = rotation)
    }

    /// Sets rotation from Euler angles (XYZ order, radians).
    #[inline]
    pub fn set_rotation_euler(self, x: f32, y: f32, z: f32) -> Self {
        self.edit(|t| t.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z))
    }

    /// Rotates around the Y axis by `angle` radians (cumulative).
    #[inline]
    pub fn rotate_y(self, angle: f32) -> Self {
        self.edit(|t| t.rotation *= Quat::from_rotation_y(angle))
    }
}

// ============================================================================
// Actor
// ============================================================================

pub struct ActorMut<'a> {
    world: &'a mut World,
    vid: Vid,
}

impl ActorMut<'_> {
    #[inline]
    #[must_use]
    pub fn vid(&self) -> Vid {
        self.vid
    }

    pub fn set_geometry(self, geometry: Vid) -> Self {
        if let Err(err) = self.world.set_actor_geometry(self.vid, geometry) {
            log::debug!("set_geometry on {:?} ignored: {err}", self.vid);
        }
        self
    }

    /// Sets one material slot, growing the slot list as needed.
    pub fn set_material_instance(self, slot: usize, material_instance: Vid) -> Self {
        if let Err(err) =
            self.world
                .set_actor_material_instance(self.vid, slot, material_instance)
        {
            log::debug!("set_material_instance on {:?} ignored: {err}", self.vid);
        }
        self
    }

    pub fn set_skeleton(self, skeleton: Vid) -> Self {
        if let Err(err) = self.world.set_actor_skeleton(self.vid, skeleton) {
            log::debug!("set_skeleton on {:?} ignored: {err}", self.vid);
        }
        self
    }

    #[inline]
    pub fn set_visible(self, visible: bool) -> Self {
        if let Some(actor) = self.world.get_actor_res_mut(self.vid) {
            actor.visible = visible;
        }
        self
    }

    #[inline]
    pub fn set_cast_shadow(self, cast: bool) -> Self {
        if let Some(actor) = self.world.get_actor_res_mut(self.vid) {
            actor.cast_shadow = cast;
        }
        self
    }

    #[inline]
    pub fn set_receive_shadow(self, receive: bool) -> Self {
        if let Some(actor) = self.world.get_actor_res_mut(self.vid) {
            actor.receive_shadow = receive;
        }
        self
    }

    #[inline]
    pub fn set_layer_mask(self, mask: u32) -> Self {
        if let Some(actor) = self.world.get_actor_res_mut(self.vid) {
            actor.layer_mask = mask;
        }
        self
    }
}

// ============================================================================
// Light
// ============================================================================

pub struct LightMut<'a> {
    world: &'a mut World,
    vid: Vid,
}

impl LightMut<'_> {
    #[inline]
    #[must_use]
    pub fn vid(&self) -> Vid {
        self.vid
    }

    #[inline]
    pub fn set_kind(self, kind: LightKind) -> Self {
        if let Some(light) = self.world.get_light_res_mut(self.vid) {
            light.kind = kind;
        }
        self
    }

    #[inline]
    pub fn set_color(self, color: Vec3) -> Self {
        if let Some(light) = self.world.get_light_res_mut(self.vid) {
            light.color = color;
        }
        self
    }

    #[inline]
    pub fn set_intensity(self, intensity: f32) -> Self {
        if let Some(light) = self.world.get_light_res_mut(self.vid) {
            light.intensity = intensity;
        }
        self
    }

    #[inline]
    pub fn set_cast_shadow(self, cast: bool) -> Self {
        if let Some(light) = self.world.get_light_res_mut(self.vid) {
            light.cast_shadow = cast;
        }
        self
    }
}

// ============================================================================
// Camera
// ============================================================================

pub struct CameraMut<'a> {
    world: &'a mut World,
    vid: Vid,
}

impl CameraMut<'_> {
    #[inline]
    #[must_use]
    pub fn vid(&self) -> Vid {
        self.vid
    }

    #[inline]
    pub fn set_projection(self, projection: Projection) -> Self {
        if let Some(camera) = self.world.get_camera_res_mut(self.vid) {
            camera.projection = projection;
        }
        self
    }

    /// Updates the aspect ratio of either projection.
    pub fn set_aspect(self, aspect: f32) -> Self {
        if let Some(camera) = self.world.get_camera_res_mut(self.vid) {
            match &mut camera.projection {
                Projection::Perspective { aspect: a, .. }
                | Projection::Orthographic { aspect: a, .. } => *a = aspect,
            }
        }
        self
    }
}

// ============================================================================
// Material instance
// ============================================================================

pub struct MaterialInstanceMut<'a> {
    world: &'a mut World,
    vid: Vid,
}

impl MaterialInstanceMut<'_> {
    #[inline]
    #[must_use]
    pub fn vid(&self) -> Vid {
        self.vid
    }

    /// Binds a texture parameter. The texture's back-reference set follows.
    pub fn set_texture(self, param: &str, texture: Vid) -> Self {
        if let Err(err) = self.world.bind_texture(self.vid, param, texture) {
            log::debug!("set_texture on {:?} ignored: {err}", self.vid);
        }
        self
    }

    #[inline]
    pub fn set_float(self, param: &str, value: f32) -> Self {
        if let Some(mi) = self.world.get_material_instance_res_mut(self.vid) {
            mi.params.insert(param.to_string(), ParamValue::Float(value));
        }
        self
    }

    #[inline]
    pub fn set_vec4(self, param: &str, value: Vec4) -> Self {
        if let Some(mi) = self.world.get_material_instance_res_mut(self.vid) {
            mi.params.insert(param.to_string(), ParamValue::Vec4(value));
        }
        self
    }
}
