//! Asset Instantiation Tests
//!
//! Tests for:
//! - AssetPrefab -> registered components
//! - Ownership of sub-resources, skeletons and bones
//! - Actor hierarchy, material slots and skins
//! - Prefab validation
//! - Asset removal

use glam::Vec3;
use scene_registry::assets::{
    AssetPrefab, PrefabGeometry, PrefabMaterial, PrefabMaterialInstance, PrefabNode,
    PrefabSkeleton, PrefabTexture,
};
use scene_registry::{
    ComponentKind, INVALID_VID, PrimitiveDesc, RegistryError, RegistrySettings, ShadingModel,
    TextureFormat, World,
};

fn new_world() -> World {
    let _ = env_logger::builder().is_test(true).try_init();
    World::new(RegistrySettings::bare()).unwrap()
}

fn named(name: &str) -> PrefabNode {
    PrefabNode {
        name: Some(name.to_string()),
        ..PrefabNode::default()
    }
}

/// A skinned character: `body` (mesh, skinned) and `armature` at the root,
/// `armature` -> `hip` -> `knee` as bones.
fn character_prefab() -> AssetPrefab {
    let mut body = named("body");
    body.geometry = Some(0);
    body.material_instances = vec![0];
    body.skin_index = Some(0);

    let mut armature = named("armature");
    armature.children_indices = vec![2];
    armature.transform.position = Vec3::new(0.0, 1.0, 0.0);

    let mut hip = named("hip");
    hip.children_indices = vec![3];

    AssetPrefab {
        textures: vec![PrefabTexture {
            name: "skin".into(),
            width: 256,
            height: 256,
            format: TextureFormat::Rgba8Srgb,
        }],
        materials: vec![PrefabMaterial {
            name: "skin_mat".into(),
            shading_model: ShadingModel::Lit,
        }],
        material_instances: vec![PrefabMaterialInstance {
            name: "skin_mi".into(),
            material_index: 0,
            textures: vec![("baseColorMap".into(), 0)],
            params: Vec::new(),
        }],
        geometries: vec![PrefabGeometry {
            name: "body_mesh".into(),
            primitives: vec![PrimitiveDesc::triangles(
                vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                vec![0, 1, 2],
            )],
        }],
        nodes: vec![body, armature, hip, named("knee")],
        root_indices: vec![0, 1],
        skeletons: vec![PrefabSkeleton {
            name: "rig".into(),
            root_bone_index: 0,
            bone_indices: vec![2, 3],
        }],
        animations: vec!["walk".into()],
    }
}

// ============================================================================
// Instantiation
// ============================================================================

#[test]
fn instantiate_registers_owned_resources() {
    let mut world = new_world();
    let asset = world
        .instantiate_asset("character", &character_prefab())
        .unwrap();

    assert_eq!(world.kind(asset), Some(ComponentKind::Asset));
    let record = world.get_asset_res(asset).unwrap();
    assert_eq!(record.animations, vec!["walk".to_string()]);
    assert_eq!(record.root_vids.len(), 2);

    for name in ["skin", "skin_mat", "skin_mi", "body_mesh", "rig", "hip", "knee"] {
        let vids = world.find_vids_by_name(name);
        assert_eq!(vids.len(), 1, "{name}");
        assert_eq!(world.get_asset_owner(vids[0]), asset, "{name}");
    }

    // Actors belong to the caller.
    let body = world.find_vids_by_name("body")[0];
    assert_eq!(world.get_asset_owner(body), INVALID_VID);
    assert_eq!(world.kind(body), Some(ComponentKind::Actor));
    world.check_consistency().unwrap();
}

#[test]
fn instantiate_wires_references() {
    let mut world = new_world();
    world
        .instantiate_asset("character", &character_prefab())
        .unwrap();

    let body = world.find_vids_by_name("body")[0];
    let armature = world.find_vids_by_name("armature")[0];
    let hip = world.find_vids_by_name("hip")[0];
    let knee = world.find_vids_by_name("knee")[0];
    let mesh = world.find_vids_by_name("body_mesh")[0];
    let mi = world.find_vids_by_name("skin_mi")[0];
    let texture = world.find_vids_by_name("skin")[0];
    let rig = world.find_vids_by_name("rig")[0];

    let actor = world.get_actor_res(body).unwrap();
    assert_eq!(actor.geometry, mesh);
    assert_eq!(actor.material_instances, vec![mi]);
    assert_eq!(actor.skeleton, rig);

    assert_eq!(world.bound_texture(mi, "baseColorMap"), texture);
    assert_eq!(world.parent_of(hip), armature);
    assert_eq!(world.parent_of(knee), hip);
    assert_eq!(world.get_skeleton_res(rig).unwrap().root_bone, hip);

    let position = world.transform(armature).unwrap().transform.position;
    assert_eq!(position, Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn instantiated_asset_can_be_placed_in_a_scene() {
    let mut world = new_world();
    let scene = world.create_scene("level").unwrap();
    let asset = world
        .instantiate_asset("character", &character_prefab())
        .unwrap();

    let roots = world.get_asset_res(asset).unwrap().root_vids.clone();
    for root in roots {
        world.append_scene_entity_to_parent(root, scene).unwrap();
    }

    let knee = world.find_vids_by_name("knee")[0];
    assert!(world.native_scene(scene).unwrap().has_entity(knee));
    world.check_consistency().unwrap();
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn invalid_indices_are_rejected_before_creation() {
    let mut world = new_world();
    let mut prefab = character_prefab();
    prefab.nodes[0].geometry = Some(5);

    let err = world.instantiate_asset("broken", &prefab).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidPrefab { index: 5, .. }));
    assert!(world.is_empty());
}

#[test]
fn node_with_two_parents_is_rejected() {
    let mut world = new_world();
    let mut prefab = character_prefab();
    prefab.nodes[0].children_indices = vec![3];

    let err = world.instantiate_asset("broken", &prefab).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidPrefab { index: 3, .. }));
    assert!(world.is_empty());
}

#[test]
fn hierarchy_cycle_rolls_back() {
    let mut world = new_world();
    let mut prefab = character_prefab();
    // knee -> armature closes armature -> hip -> knee -> armature.
    prefab.nodes[3].children_indices = vec![1];

    let err = world.instantiate_asset("broken", &prefab).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidPrefab { .. }));
    assert!(world.is_empty());
    assert_eq!(world.engine().entities.len(), 0);
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn owned_resources_survive_unforced_removal() {
    let mut world = new_world();
    let asset = world
        .instantiate_asset("character", &character_prefab())
        .unwrap();
    let mesh = world.find_vids_by_name("body_mesh")[0];

    let err = world.remove_component(mesh, false).unwrap_err();
    assert!(matches!(err, RegistryError::AssetOwned { owner, .. } if owner == asset));
    assert!(world.contains(mesh));
}

#[test]
fn removing_the_asset_leaves_actors_sanitized() {
    let mut world = new_world();
    let asset = world
        .instantiate_asset("character", &character_prefab())
        .unwrap();
    let body = world.find_vids_by_name("body")[0];
    let armature = world.find_vids_by_name("armature")[0];
    let knee = world.find_vids_by_name("knee")[0];

    world.remove_component(asset, false).unwrap();

    assert!(!world.contains(asset));
    assert!(world.transform(knee).is_none());
    let actor = world.get_actor_res(body).unwrap();
    assert_eq!(actor.geometry, INVALID_VID);
    assert_eq!(actor.material_instances, vec![INVALID_VID]);
    assert_eq!(actor.skeleton, INVALID_VID);
    // Only the actors are left.
    assert_eq!(world.vids(), {
        let mut v = vec![body, armature];
        v.sort_unstable();
        v
    });
    assert_eq!(world.engine().resources.live_count(), 0);
    world.check_consistency().unwrap();
}
