use std::collections::BTreeSet;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::core::{INVALID_VID, Vid};
use crate::records::AssetHandle;

/// A composite loaded asset (e.g. one glTF file).
#[derive(Debug, Clone)]
pub struct AssetRecord {
    pub handle: AssetHandle,
    pub source: String,
    /// Every sub-resource created while loading this asset. Each of them
    /// carries `asset_owner == Some(handle)`.
    pub ownership: BTreeSet<Vid>,
    /// Root nodes the asset instantiated. These are not owned.
    pub root_vids: Vec<Vid>,
    pub animations: Vec<String>,
}

impl AssetRecord {
    #[must_use]
    pub fn new(handle: AssetHandle, source: &str) -> Self {
        Self {
            handle,
            source: source.to_string(),
            ownership: BTreeSet::new(),
            root_vids: Vec::new(),
            animations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderTarget {
    /// Presents to a window; exposed as a `Renderer` component.
    #[default]
    Swapchain,
    /// Renders into an offscreen texture; exposed as a `RenderPath` component.
    Offscreen,
}

#[derive(Debug, Clone)]
pub struct RenderPathRecord {
    pub target: RenderTarget,
    pub width: u32,
    pub height: u32,
    pub camera: Vid,
    pub clear_color: Vec4,
    pub msaa_samples: u32,
}

impl RenderPathRecord {
    #[must_use]
    pub fn new(target: RenderTarget, width: u32, height: u32) -> Self {
        Self {
            target,
            width,
            height,
            camera: INVALID_VID,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            msaa_samples: 1,
        }
    }
}
