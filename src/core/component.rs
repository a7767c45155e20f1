use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::Vid;

/// The closed set of client-facing component kinds.
///
/// Dispatch sites match on this exhaustively instead of down-casting a
/// type-erased wrapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Scene,
    Camera,
    Light,
    Actor,
    SpriteActor,
    TextSpriteActor,
    Geometry,
    Material,
    MaterialInstance,
    Texture,
    Font,
    Skeleton,
    Asset,
    /// Offscreen render path
    RenderPath,
    /// Render path presenting to a swapchain
    Renderer,
}

impl ComponentKind {
    /// Components that live in the transform hierarchy and can be placed in
    /// a scene.
    #[inline]
    #[must_use]
    pub fn is_scene_component(self) -> bool {
        matches!(
            self,
            Self::Camera | Self::Light | Self::Actor | Self::SpriteActor | Self::TextSpriteActor
        )
    }

    /// Any of the three actor variants.
    #[inline]
    #[must_use]
    pub fn is_actor(self) -> bool {
        matches!(self, Self::Actor | Self::SpriteActor | Self::TextSpriteActor)
    }

    /// Renderer data (as opposed to placed scene nodes).
    #[inline]
    #[must_use]
    pub fn is_resource(self) -> bool {
        matches!(
            self,
            Self::Geometry
                | Self::Material
                | Self::MaterialInstance
                | Self::Texture
                | Self::Font
                | Self::Skeleton
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scene => "Scene",
            Self::Camera => "Camera",
            Self::Light => "Light",
            Self::Actor => "Actor",
            Self::SpriteActor => "SpriteActor",
            Self::TextSpriteActor => "TextSpriteActor",
            Self::Geometry => "Geometry",
            Self::Material => "Material",
            Self::MaterialInstance => "MaterialInstance",
            Self::Texture => "Texture",
            Self::Font => "Font",
            Self::Skeleton => "Skeleton",
            Self::Asset => "Asset",
            Self::RenderPath => "RenderPath",
            Self::Renderer => "Renderer",
        }
    }
}

/// The client-facing object behind a VID.
///
/// The name is not stored here; it lives in the native name component
/// manager and is looked up through the world.
#[derive(Debug, Clone)]
pub struct Component {
    vid: Vid,
    kind: ComponentKind,
    timestamp: Instant,
}

impl Component {
    #[must_use]
    pub fn new(vid: Vid, kind: ComponentKind) -> Self {
        Self {
            vid,
            kind,
            timestamp: Instant::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn vid(&self) -> Vid {
        self.vid
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Last time the component (or its record) was modified.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Marks the component as modified now.
    #[inline]
    pub fn touch(&mut self) {
        self.timestamp = Instant::now();
    }
}
