//! Asset instantiation.
//!
//! Turns an [`AssetPrefab`] into registered components. Sub-resources,
//! skeletons and bones are adopted into the asset's ownership set; actors
//! are handed to the caller and only listed as the asset's roots.

use rustc_hash::FxHashSet;

use crate::assets::prefab::AssetPrefab;
use crate::core::{INVALID_VID, Vid};
use crate::errors::{RegistryError, Result};
use crate::world::World;

fn invalid(context: &str, index: usize) -> RegistryError {
    RegistryError::InvalidPrefab {
        context: context.to_string(),
        index,
    }
}

/// Rejects any out-of-range index before the world is touched.
fn validate(prefab: &AssetPrefab) -> Result<()> {
    for mi in &prefab.material_instances {
        if mi.material_index >= prefab.materials.len() {
            return Err(invalid("material instance material", mi.material_index));
        }
        if let Some(&(_, texture)) = mi.textures.iter().find(|(_, t)| *t >= prefab.textures.len()) {
            return Err(invalid("material instance texture", texture));
        }
    }
    for node in &prefab.nodes {
        if let Some(geometry) = node.geometry
            && geometry >= prefab.geometries.len()
        {
            return Err(invalid("node geometry", geometry));
        }
        if let Some(&mi) = node
            .material_instances
            .iter()
            .find(|&&mi| mi >= prefab.material_instances.len())
        {
            return Err(invalid("node material instance", mi));
        }
        if let Some(skin) = node.skin_index
            && skin >= prefab.skeletons.len()
        {
            return Err(invalid("node skin", skin));
        }
        if let Some(&child) = node
            .children_indices
            .iter()
            .find(|&&c| c >= prefab.nodes.len())
        {
            return Err(invalid("node child", child));
        }
    }
    if let Some(&root) = prefab.root_indices.iter().find(|&&r| r >= prefab.nodes.len()) {
        return Err(invalid("root node", root));
    }
    for skeleton in &prefab.skeletons {
        if skeleton.root_bone_index >= skeleton.bone_indices.len() && !skeleton.bone_indices.is_empty() {
            return Err(invalid("skeleton root bone", skeleton.root_bone_index));
        }
        if let Some(&bone) = skeleton
            .bone_indices
            .iter()
            .find(|&&b| b >= prefab.nodes.len())
        {
            return Err(invalid("skeleton bone", bone));
        }
    }

    // Every node may have at most one parent.
    let mut seen = FxHashSet::default();
    for node in &prefab.nodes {
        for &child in &node.children_indices {
            if !seen.insert(child) {
                return Err(invalid("node with two parents", child));
            }
        }
    }
    Ok(())
}

impl World {
    /// Registers the contents of `prefab` as a new asset named `name`.
    ///
    /// Returns the asset VID. A prefab with an out-of-range index is
    /// rejected with [`RegistryError::InvalidPrefab`] before anything is
    /// created.
    pub fn instantiate_asset(&mut self, name: &str, prefab: &AssetPrefab) -> Result<Vid> {
        validate(prefab)?;

        let asset = self.create_asset(name, name)?;
        let mut actors = Vec::new();
        match self.instantiate_into(asset, name, prefab, &mut actors) {
            Ok(()) => {
                log::info!(
                    "Instantiated asset '{name}': {} nodes, {} geometries, {} skeletons",
                    prefab.nodes.len(),
                    prefab.geometries.len(),
                    prefab.skeletons.len()
                );
                Ok(asset)
            }
            Err(err) => {
                log::error!("Instantiating asset '{name}' failed: {err}");
                for actor in actors {
                    if let Err(cleanup) = self.remove_component(actor, true) {
                        log::error!("Cleanup of {actor:?} failed: {cleanup}");
                    }
                }
                if let Err(cleanup) = self.remove_component(asset, true) {
                    log::error!("Cleanup of asset {asset:?} failed: {cleanup}");
                }
                Err(err)
            }
        }
    }

    fn instantiate_into(
        &mut self,
        asset: Vid,
        asset_name: &str,
        prefab: &AssetPrefab,
        actors: &mut Vec<Vid>,
    ) -> Result<()> {
        // 1. Resources
        let mut textures = Vec::with_capacity(prefab.textures.len());
        for texture in &prefab.textures {
            let vid = self.create_texture(&texture.name, texture.width, texture.height, texture.format)?;
            self.adopt_into_asset(asset, vid)?;
            textures.push(vid);
        }

        let mut materials = Vec::with_capacity(prefab.materials.len());
        for material in &prefab.materials {
            let vid = self.create_material(&material.name, material.shading_model)?;
            self.adopt_into_asset(asset, vid)?;
            materials.push(vid);
        }

        let mut material_instances = Vec::with_capacity(prefab.material_instances.len());
        for desc in &prefab.material_instances {
            let vid = self.create_material_instance(&desc.name, materials[desc.material_index])?;
            for (param, texture) in &desc.textures {
                self.bind_texture(vid, param, textures[*texture])?;
            }
            if let Some(record) = self.material_instances.get_mut(&vid) {
                record.params.extend(desc.params.iter().cloned());
            }
            self.adopt_into_asset(asset, vid)?;
            material_instances.push(vid);
        }

        let mut geometries = Vec::with_capacity(prefab.geometries.len());
        for geometry in &prefab.geometries {
            let vid = self.create_geometry(&geometry.name, &geometry.primitives)?;
            self.adopt_into_asset(asset, vid)?;
            geometries.push(vid);
        }

        // 2. Nodes
        let mut nodes = Vec::with_capacity(prefab.nodes.len());
        for (index, node) in prefab.nodes.iter().enumerate() {
            let node_name = node
                .name
                .clone()
                .unwrap_or_else(|| format!("{asset_name}_node{index}"));
            let vid = if prefab.is_bone(index) {
                let bone = self.create_bone(&node_name, INVALID_VID)?;
                self.adopt_into_asset(asset, bone)?;
                bone
            } else {
                let geometry = node.geometry.map_or(INVALID_VID, |g| geometries[g]);
                let slots: Vec<Vid> = node
                    .material_instances
                    .iter()
                    .map(|&mi| material_instances[mi])
                    .collect();
                let actor = self.create_actor(&node_name, geometry, &slots)?;
                actors.push(actor);
                actor
            };
            if let Some(transform) = self.engine.transforms.get_mut(vid) {
                transform.transform = node.transform;
            }
            nodes.push(vid);
        }

        // 3. Hierarchy
        for (index, node) in prefab.nodes.iter().enumerate() {
            for &child in &node.children_indices {
                if !self.engine.transforms.set_parent(nodes[child], Some(nodes[index])) {
                    return Err(invalid("node hierarchy", child));
                }
            }
        }

        // 4. Skeletons
        let mut skeletons = Vec::with_capacity(prefab.skeletons.len());
        for skeleton in &prefab.skeletons {
            let mut bones: Vec<Vid> = skeleton.bone_indices.iter().map(|&b| nodes[b]).collect();
            if skeleton.root_bone_index < bones.len() {
                let root = bones.remove(skeleton.root_bone_index);
                bones.insert(0, root);
            }
            let vid = self.create_skeleton(&skeleton.name, &bones)?;
            self.adopt_into_asset(asset, vid)?;
            skeletons.push(vid);
        }
        for (index, node) in prefab.nodes.iter().enumerate() {
            if let Some(skin) = node.skin_index
                && !prefab.is_bone(index)
            {
                self.set_actor_skeleton(nodes[index], skeletons[skin])?;
            }
        }

        // 5. Asset record
        if let Some(record) = self.assets.get_mut(&asset) {
            record.root_vids = prefab.root_indices.iter().map(|&r| nodes[r]).collect();
            record.animations.clone_from(&prefab.animations);
        }
        self.touch(asset);
        Ok(())
    }
}
