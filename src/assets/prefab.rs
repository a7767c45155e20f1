use crate::native::Transform;
use crate::records::{ParamValue, ShadingModel, TextureFormat};
use crate::world::PrimitiveDesc;

#[derive(Debug, Clone)]
pub struct PrefabTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

#[derive(Debug, Clone)]
pub struct PrefabMaterial {
    pub name: String,
    pub shading_model: ShadingModel,
}

#[derive(Debug, Clone)]
pub struct PrefabMaterialInstance {
    pub name: String,
    /// Index into `AssetPrefab::materials`
    pub material_index: usize,
    /// Texture parameter bindings, as indices into `AssetPrefab::textures`
    pub textures: Vec<(String, usize)>,
    pub params: Vec<(String, ParamValue)>,
}

#[derive(Debug, Clone)]
pub struct PrefabGeometry {
    pub name: String,
    pub primitives: Vec<PrimitiveDesc>,
}

/// Prefab node: plain data, children referenced by index.
#[derive(Debug, Clone)]
pub struct PrefabNode {
    pub name: Option<String>,
    pub transform: Transform,
    /// Indices of child nodes in `AssetPrefab::nodes`
    pub children_indices: Vec<usize>,
    /// Index into `AssetPrefab::geometries`
    pub geometry: Option<usize>,
    /// One entry per material slot, indices into
    /// `AssetPrefab::material_instances`
    pub material_instances: Vec<usize>,
    /// Index into `AssetPrefab::skeletons`
    pub skin_index: Option<usize>,
}

impl PrefabNode {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            transform: Transform::IDENTITY,
            children_indices: Vec::new(),
            geometry: None,
            material_instances: Vec::new(),
            skin_index: None,
        }
    }
}

impl Default for PrefabNode {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct PrefabSkeleton {
    pub name: String,
    /// Index of the root bone within `bone_indices`
    pub root_bone_index: usize,
    /// Bone nodes (indices into `AssetPrefab::nodes`)
    pub bone_indices: Vec<usize>,
}

/// Loader output for one asset file.
///
/// The prefab holds no VIDs and no reference to a world; it is turned into
/// registered components by [`World::instantiate_asset`](crate::World::instantiate_asset).
/// Nodes referenced by a skeleton become bones, every other node becomes a
/// mesh actor.
#[derive(Debug, Clone, Default)]
pub struct AssetPrefab {
    pub textures: Vec<PrefabTexture>,
    pub materials: Vec<PrefabMaterial>,
    pub material_instances: Vec<PrefabMaterialInstance>,
    pub geometries: Vec<PrefabGeometry>,
    /// All nodes, flattened
    pub nodes: Vec<PrefabNode>,
    /// Indices of the top-level nodes
    pub root_indices: Vec<usize>,
    pub skeletons: Vec<PrefabSkeleton>,
    /// Animation clip names
    pub animations: Vec<String>,
}

impl AssetPrefab {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if node `index` is listed as a bone by any skeleton.
    #[must_use]
    pub fn is_bone(&self, index: usize) -> bool {
        self.skeletons
            .iter()
            .any(|s| s.bone_indices.contains(&index))
    }
}
