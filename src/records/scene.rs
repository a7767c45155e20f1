use glam::{Vec2, Vec3};

use crate::core::{INVALID_VID, Vid};
use crate::native::NativeSceneKey;

#[derive(Debug, Clone)]
pub struct SceneRecord {
    pub native: NativeSceneKey,
}

// ============================================================================
// Camera
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        half_height: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective {
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CameraRecord {
    pub projection: Projection,
    /// Frustum gizmo geometry owned by this camera, `INVALID_VID` if none.
    pub helper_geometry: Vid,
}

// ============================================================================
// Light
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional,
    Point {
        range: f32,
    },
    Spot {
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    },
}

#[derive(Debug, Clone)]
pub struct LightRecord {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    pub cast_shadow: bool,
}

impl LightRecord {
    #[must_use]
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            color: Vec3::ONE,
            intensity: 1.0,
            cast_shadow: false,
        }
    }
}

// ============================================================================
// Actor
// ============================================================================

#[derive(Debug, Clone)]
pub struct SpriteParams {
    pub texture: Vid,
    pub size: Vec2,
    pub anchor: Vec2,
}

impl Default for SpriteParams {
    fn default() -> Self {
        Self {
            texture: INVALID_VID,
            size: Vec2::ONE,
            anchor: Vec2::splat(0.5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextParams {
    pub font: Vid,
    pub text: String,
    pub font_size: f32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            font: INVALID_VID,
            text: String::new(),
            font_size: 12.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum ActorVariant {
    #[default]
    Mesh,
    Sprite(SpriteParams),
    Text(TextParams),
}

/// Highest number of material instance slots an actor may have.
pub const MAX_MATERIAL_SLOTS: usize = 256;

/// A renderable placed in the scene.
///
/// `geometry` and the material instance slots are references to other
/// records; the cascade resets them to `INVALID_VID` when their target goes
/// away.
#[derive(Debug, Clone)]
pub struct ActorRecord {
    pub variant: ActorVariant,
    pub geometry: Vid,
    pub material_instances: Vec<Vid>,
    pub skeleton: Vid,
    pub layer_mask: u32,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl ActorRecord {
    #[must_use]
    pub fn new(variant: ActorVariant) -> Self {
        Self {
            variant,
            geometry: INVALID_VID,
            material_instances: Vec::new(),
            skeleton: INVALID_VID,
            layer_mask: u32::MAX,
            visible: true,
            cast_shadow: true,
            receive_shadow: true,
        }
    }

    /// Every VID this actor refers to.
    pub fn references(&self) -> impl Iterator<Item = Vid> + '_ {
        let variant_ref = match &self.variant {
            ActorVariant::Mesh => INVALID_VID,
            ActorVariant::Sprite(sprite) => sprite.texture,
            ActorVariant::Text(text) => text.font,
        };
        [self.geometry, self.skeleton, variant_ref]
            .into_iter()
            .chain(self.material_instances.iter().copied())
            .filter(|v| v.is_valid())
    }
}
