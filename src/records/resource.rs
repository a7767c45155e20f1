use std::collections::BTreeMap;

use glam::{Vec3, Vec4};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::{INVALID_VID, Vid};
use crate::native::{
    NativeBufferKey, NativeFontKey, NativeMaterialInstanceKey, NativeMaterialKey,
    NativeTextureKey,
};
use crate::records::Ownership;

// ============================================================================
// Geometry
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::EMPTY, |acc, &p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    #[default]
    TriangleList,
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub vertex_buffer: NativeBufferKey,
    pub index_buffer: Option<NativeBufferKey>,
    pub vertex_count: u32,
    pub index_count: u32,
    pub topology: PrimitiveTopology,
}

#[derive(Debug, Clone)]
pub struct GeometryRecord {
    pub primitives: Vec<Primitive>,
    pub aabb: Aabb,
    pub ownership: Ownership,
}

// ============================================================================
// Material & Material Instance
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadingModel {
    Unlit,
    #[default]
    Lit,
    Sprite,
    Text,
}

#[derive(Debug, Clone)]
pub struct MaterialRecord {
    pub native: NativeMaterialKey,
    pub shading_model: ShadingModel,
    pub ownership: Ownership,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Vec4(Vec4),
}

#[derive(Debug, Clone)]
pub struct MaterialInstanceRecord {
    pub native: NativeMaterialInstanceKey,
    /// The material this instance was created from.
    pub material: Vid,
    /// Texture parameter name -> texture VID.
    pub textures: BTreeMap<String, Vid>,
    pub params: BTreeMap<String, ParamValue>,
    pub ownership: Ownership,
}

impl MaterialInstanceRecord {
    /// Drops every texture parameter bound to `texture`. Returns how many.
    pub fn strip_texture(&mut self, texture: Vid) -> usize {
        let before = self.textures.len();
        self.textures.retain(|_, &mut t| t != texture);
        before - self.textures.len()
    }
}

// ============================================================================
// Texture
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureFormat {
    #[default]
    Rgba8,
    Rgba8Srgb,
    Rgba16Float,
}

#[derive(Debug, Clone)]
pub struct TextureRecord {
    pub native: NativeTextureKey,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Material instances that bind this texture.
    pub assigned_mis: FxHashSet<Vid>,
    pub ownership: Ownership,
}

// ============================================================================
// Font & Skeleton
// ============================================================================

#[derive(Debug, Clone)]
pub struct FontRecord {
    pub native: NativeFontKey,
    pub source: String,
    pub size: f32,
    pub ownership: Ownership,
}

#[derive(Debug, Clone)]
pub struct SkeletonRecord {
    /// Bone VID -> bone name.
    pub bones: BTreeMap<Vid, String>,
    pub root_bone: Vid,
    pub ownership: Ownership,
}

impl SkeletonRecord {
    #[must_use]
    pub fn new(ownership: Ownership) -> Self {
        Self {
            bones: BTreeMap::new(),
            root_bone: INVALID_VID,
            ownership,
        }
    }
}
