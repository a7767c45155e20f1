//! Native renderer resources.
//!
//! Stand-ins for the engine's GPU-side objects. The registry only ever holds
//! their keys; whoever erases the last record pointing at a key destroys it.

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct NativeMaterialKey;
    pub struct NativeMaterialInstanceKey;
    pub struct NativeTextureKey;
    pub struct NativeBufferKey;
    pub struct NativeFontKey;
}

#[derive(Debug, Clone)]
pub struct NativeMaterial {
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct NativeMaterialInstance {
    pub material: NativeMaterialKey,
}

#[derive(Debug, Clone)]
pub struct NativeTexture {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
}

#[derive(Debug, Clone)]
pub struct NativeBuffer {
    pub usage: BufferUsage,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct NativeFont {
    pub source: String,
}

#[derive(Debug, Default)]
pub struct NativeResources {
    pub materials: SlotMap<NativeMaterialKey, NativeMaterial>,
    pub material_instances: SlotMap<NativeMaterialInstanceKey, NativeMaterialInstance>,
    pub textures: SlotMap<NativeTextureKey, NativeTexture>,
    pub buffers: SlotMap<NativeBufferKey, NativeBuffer>,
    pub fonts: SlotMap<NativeFontKey, NativeFont>,
}

impl NativeResources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_material(&mut self, label: &str) -> NativeMaterialKey {
        self.materials.insert(NativeMaterial {
            label: label.to_string(),
        })
    }

    pub fn create_material_instance(
        &mut self,
        material: NativeMaterialKey,
    ) -> NativeMaterialInstanceKey {
        self.material_instances
            .insert(NativeMaterialInstance { material })
    }

    pub fn create_texture(&mut self, width: u32, height: u32) -> NativeTextureKey {
        self.textures.insert(NativeTexture { width, height })
    }

    pub fn create_buffer(&mut self, usage: BufferUsage, size: u64) -> NativeBufferKey {
        self.buffers.insert(NativeBuffer { usage, size })
    }

    pub fn create_font(&mut self, source: &str) -> NativeFontKey {
        self.fonts.insert(NativeFont {
            source: source.to_string(),
        })
    }

    /// Total number of live native objects of every kind.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.materials.len()
            + self.material_instances.len()
            + self.textures.len()
            + self.buffers.len()
            + self.fonts.len()
    }
}
