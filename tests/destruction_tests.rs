//! Destruction Cascade Tests
//!
//! Tests for:
//! - Ownership protection (system and asset owned resources)
//! - Material -> material instance cascade
//! - Texture / material instance reference stripping
//! - Dangling actor reference reset
//! - Camera helper geometry and render path cleanup
//! - Asset ownership set removal
//! - Scene removal and full release

use glam::Vec3;
use scene_registry::{
    ActorVariant, INVALID_VID, LightKind, Ownership, PrimitiveDesc, Projection, RegistryError,
    RegistrySettings, ShadingModel, SpriteParams, TextParams, TextureFormat, Vid, World,
};

fn new_world() -> World {
    let _ = env_logger::builder().is_test(true).try_init();
    World::new(RegistrySettings::bare()).unwrap()
}

fn triangle() -> PrimitiveDesc {
    PrimitiveDesc::triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2])
}

/// Material with two instances and an actor using the first one.
fn material_setup(world: &mut World) -> (Vid, Vid, Vid, Vid) {
    let material = world.create_material("m", ShadingModel::Lit).unwrap();
    let mi1 = world.create_material_instance("mi1", material).unwrap();
    let mi2 = world.create_material_instance("mi2", material).unwrap();
    let actor = world.create_actor("a", INVALID_VID, &[mi1]).unwrap();
    (material, mi1, mi2, actor)
}

// ============================================================================
// Basic removal
// ============================================================================

#[test]
fn remove_unknown_vid_is_not_found() {
    let mut world = new_world();
    let ghost = Vid::from_parts(77, 0);
    assert!(matches!(
        world.remove_component(ghost, false),
        Err(RegistryError::NotFound(v)) if v == ghost
    ));
}

#[test]
fn removed_vid_stops_resolving() {
    let mut world = new_world();
    let light = world.create_light("l", LightKind::Directional).unwrap();

    world.remove_component(light, false).unwrap();

    assert!(!world.contains(light));
    assert!(world.get_light_res(light).is_none());
    assert_eq!(world.membership(light), None);
    assert_eq!(world.name(light), None);
    assert!(world.transform(light).is_none());
    assert!(matches!(
        world.remove_component(light, false),
        Err(RegistryError::NotFound(_))
    ));

    // The slot is reused with a new generation.
    let next = world.create_light("l2", LightKind::Directional).unwrap();
    assert_eq!(next.index(), light.index());
    assert_ne!(next, light);
    world.check_consistency().unwrap();
}

#[test]
fn removed_actor_leaves_its_scene() {
    let mut world = new_world();
    let scene = world.create_scene("s").unwrap();
    let a = world.create_actor("a", INVALID_VID, &[]).unwrap();
    world.append_scene_entity_to_parent(a, scene).unwrap();

    world.remove_component(a, false).unwrap();

    assert!(world.scene_entities(scene).is_empty());
    assert!(world.scene_members(scene).is_empty());
    world.check_consistency().unwrap();
}

// ============================================================================
// Ownership protection
// ============================================================================

#[test]
fn system_resources_need_force() {
    let mut world = World::new(RegistrySettings::default()).unwrap();
    let system = world.system_resources();

    for vid in [system.material, system.material_instance, system.texture] {
        let err = world.remove_component(vid, false).unwrap_err();
        assert!(matches!(err, RegistryError::SystemOwned(v) if v == vid));
        assert!(world.contains(vid));
    }

    world.remove_component(system.material, true).unwrap();
    assert!(!world.contains(system.material));
    // The instance went with its material.
    assert!(!world.contains(system.material_instance));
    assert!(world.contains(system.texture));
    assert!(
        world
            .get_texture_res(system.texture)
            .unwrap()
            .assigned_mis
            .is_empty()
    );
    world.check_consistency().unwrap();
}

#[test]
fn asset_owned_resources_need_force() {
    let mut world = new_world();
    let asset = world.create_asset("crate", "crate.gltf").unwrap();
    let geometry = world.create_geometry("g", &[triangle()]).unwrap();
    world.adopt_into_asset(asset, geometry).unwrap();
    let actor = world.create_actor("a", geometry, &[]).unwrap();

    let err = world.remove_component(geometry, false).unwrap_err();
    assert!(matches!(err, RegistryError::AssetOwned { vid, owner } if vid == geometry && owner == asset));

    // Rejected removal changed nothing.
    assert!(world.contains(geometry));
    assert_eq!(world.get_actor_res(actor).unwrap().geometry, geometry);
    world.check_consistency().unwrap();

    world.remove_component(geometry, true).unwrap();
    assert_eq!(world.get_actor_res(actor).unwrap().geometry, INVALID_VID);
    assert!(!world.get_asset_res(asset).unwrap().ownership.contains(&geometry));
    world.check_consistency().unwrap();
}

#[test]
fn asset_owner_is_reported() {
    let mut world = new_world();
    let asset = world.create_asset("crate", "crate.gltf").unwrap();
    let texture = world.create_texture("t", 2, 2, TextureFormat::Rgba8).unwrap();
    assert_eq!(world.get_asset_owner(texture), INVALID_VID);

    world.adopt_into_asset(asset, texture).unwrap();

    assert_eq!(world.get_asset_owner(texture), asset);
    let handle = world.get_asset_res(asset).unwrap().handle;
    assert_eq!(world.ownership(texture), Some(Ownership::owned_by(handle)));

    let other = world.create_asset("other", "other.gltf").unwrap();
    assert!(matches!(
        world.adopt_into_asset(other, texture),
        Err(RegistryError::AssetOwned { owner, .. }) if owner == asset
    ));
}

#[test]
fn owned_bone_needs_force() {
    let mut world = new_world();
    let asset = world.create_asset("rig", "rig.gltf").unwrap();
    let bone = world.create_bone("root", INVALID_VID).unwrap();
    world.adopt_into_asset(asset, bone).unwrap();

    assert!(matches!(
        world.remove_component(bone, false),
        Err(RegistryError::AssetOwned { .. })
    ));
    world.remove_component(bone, true).unwrap();
    assert!(world.transform(bone).is_none());
}

#[test]
fn asset_adoption_cycles_are_rejected() {
    let mut world = new_world();
    let a = world.create_asset("a", "a.gltf").unwrap();
    let b = world.create_asset("b", "b.gltf").unwrap();
    let c = world.create_asset("c", "c.gltf").unwrap();
    world.adopt_into_asset(b, a).unwrap();
    world.adopt_into_asset(c, b).unwrap();

    assert!(matches!(
        world.adopt_into_asset(a, b),
        Err(RegistryError::OwnershipCycle { vid, asset }) if vid == b && asset == a
    ));
    assert!(matches!(
        world.adopt_into_asset(a, c),
        Err(RegistryError::OwnershipCycle { vid, asset }) if vid == c && asset == a
    ));
    assert_eq!(world.get_asset_owner(b), c);
    world.check_consistency().unwrap();

    // Removing the outermost asset takes the nested ones along.
    world.remove_component(c, false).unwrap();
    for asset in [a, b, c] {
        assert!(!world.contains(asset));
    }
    assert!(world.is_empty());
    world.check_consistency().unwrap();
}

#[test]
fn nested_asset_needs_force() {
    let mut world = new_world();
    let outer = world.create_asset("outer", "outer.gltf").unwrap();
    let inner = world.create_asset("inner", "inner.gltf").unwrap();
    let texture = world.create_texture("t", 1, 1, TextureFormat::Rgba8).unwrap();
    world.adopt_into_asset(inner, texture).unwrap();
    world.adopt_into_asset(outer, inner).unwrap();

    assert!(matches!(
        world.remove_component(inner, false),
        Err(RegistryError::AssetOwned { vid, owner }) if vid == inner && owner == outer
    ));
    world.remove_component(inner, true).unwrap();
    assert!(!world.contains(texture));
    assert!(world.get_asset_res(outer).unwrap().ownership.is_empty());
    world.check_consistency().unwrap();
}

#[test]
fn scenes_cannot_be_adopted() {
    let mut world = new_world();
    let asset = world.create_asset("a", "a.gltf").unwrap();
    let scene = world.create_scene("s").unwrap();

    assert!(matches!(
        world.adopt_into_asset(asset, scene),
        Err(RegistryError::NotAdoptable { vid, .. }) if vid == scene
    ));
    assert_eq!(world.get_asset_owner(scene), INVALID_VID);
    assert!(world.get_asset_res(asset).unwrap().ownership.is_empty());
}

// ============================================================================
// Cascades
// ============================================================================

#[test]
fn material_removal_takes_its_instances() {
    let mut world = new_world();
    let (material, mi1, mi2, actor) = material_setup(&mut world);
    let unrelated_material = world.create_material("other", ShadingModel::Unlit).unwrap();
    let unrelated = world
        .create_material_instance("keep", unrelated_material)
        .unwrap();

    world.remove_component(material, false).unwrap();

    assert!(!world.contains(material));
    assert!(!world.contains(mi1));
    assert!(!world.contains(mi2));
    assert!(world.contains(unrelated));
    assert_eq!(
        world.get_actor_res(actor).unwrap().material_instances,
        vec![INVALID_VID]
    );
    world.check_consistency().unwrap();
}

#[test]
fn material_instance_removal_resets_actor_slot() {
    let mut world = new_world();
    let (_, mi1, mi2, actor) = material_setup(&mut world);
    world.set_actor_material_instance(actor, 1, mi2).unwrap();

    world.remove_component(mi1, false).unwrap();

    assert_eq!(
        world.get_actor_res(actor).unwrap().material_instances,
        vec![INVALID_VID, mi2]
    );
}

#[test]
fn texture_removal_strips_bindings_but_keeps_instances() {
    let mut world = new_world();
    let (_, mi1, mi2, _) = material_setup(&mut world);
    let texture = world.create_texture("t", 8, 8, TextureFormat::Rgba8).unwrap();
    world.bind_texture(mi1, "albedo", texture).unwrap();
    world.bind_texture(mi2, "normal", texture).unwrap();

    world.remove_component(texture, false).unwrap();

    assert!(world.contains(mi1));
    assert!(world.contains(mi2));
    assert_eq!(world.bound_texture(mi1, "albedo"), INVALID_VID);
    assert_eq!(world.bound_texture(mi2, "normal"), INVALID_VID);
    world.check_consistency().unwrap();
}

#[test]
fn material_instance_removal_updates_texture_back_references() {
    let mut world = new_world();
    let (_, mi1, mi2, _) = material_setup(&mut world);
    let texture = world.create_texture("t", 8, 8, TextureFormat::Rgba8).unwrap();
    world.bind_texture(mi1, "albedo", texture).unwrap();
    world.bind_texture(mi2, "albedo", texture).unwrap();

    world.remove_component(mi1, false).unwrap();

    let assigned = &world.get_texture_res(texture).unwrap().assigned_mis;
    assert!(!assigned.contains(&mi1));
    assert!(assigned.contains(&mi2));
    world.check_consistency().unwrap();
}

#[test]
fn sprite_and_text_references_are_reset() {
    let mut world = new_world();
    let texture = world.create_texture("atlas", 4, 4, TextureFormat::Rgba8).unwrap();
    let font = world.create_font("mono", "mono.ttf", 12.0).unwrap();
    let sprite = world
        .create_sprite_actor(
            "sprite",
            SpriteParams {
                texture,
                ..SpriteParams::default()
            },
        )
        .unwrap();
    let label = world
        .create_text_sprite_actor(
            "label",
            TextParams {
                font,
                ..TextParams::default()
            },
        )
        .unwrap();

    world.remove_component(texture, false).unwrap();
    world.remove_component(font, false).unwrap();

    match &world.get_actor_res(sprite).unwrap().variant {
        ActorVariant::Sprite(params) => assert_eq!(params.texture, INVALID_VID),
        other => panic!("unexpected variant {other:?}"),
    }
    match &world.get_actor_res(label).unwrap().variant {
        ActorVariant::Text(params) => assert_eq!(params.font, INVALID_VID),
        other => panic!("unexpected variant {other:?}"),
    }
}

#[test]
fn skeleton_removal_resets_actor_skin() {
    let mut world = new_world();
    let bone = world.create_bone("root", INVALID_VID).unwrap();
    let skeleton = world.create_skeleton("rig", &[bone]).unwrap();
    let actor = world.create_actor("body", INVALID_VID, &[]).unwrap();
    world.actor(actor).set_skeleton(skeleton);

    world.remove_component(skeleton, false).unwrap();

    assert_eq!(world.get_actor_res(actor).unwrap().skeleton, INVALID_VID);
    // Bones are nodes of their own and survive.
    assert!(world.transform(bone).is_some());
}

#[test]
fn camera_removal_takes_helper_and_clears_render_paths() {
    let mut world = new_world();
    let camera = world.create_camera("cam", Projection::default()).unwrap();
    let helper = world.create_camera_helper(camera).unwrap();
    assert_eq!(world.create_camera_helper(camera).unwrap(), helper);
    let renderer = world.create_renderer("main", 1280, 720).unwrap();
    let offscreen = world.create_render_path("shadow", 512, 512).unwrap();
    world.set_render_path_camera(renderer, camera).unwrap();
    world.set_render_path_camera(offscreen, camera).unwrap();

    world.remove_component(camera, false).unwrap();

    assert!(!world.contains(helper));
    assert_eq!(world.get_render_path_res(renderer).unwrap().camera, INVALID_VID);
    assert_eq!(world.get_render_path_res(offscreen).unwrap().camera, INVALID_VID);
    world.check_consistency().unwrap();
}

#[test]
fn helper_geometry_removal_resets_camera() {
    let mut world = new_world();
    let camera = world.create_camera("cam", Projection::default()).unwrap();
    let helper = world.create_camera_helper(camera).unwrap();

    world.remove_component(helper, false).unwrap();

    assert_eq!(world.get_camera_res(camera).unwrap().helper_geometry, INVALID_VID);
}

#[test]
fn geometry_removal_releases_buffers() {
    let mut world = new_world();
    let before = world.engine().resources.buffers.len();
    let geometry = world.create_geometry("g", &[triangle(), triangle()]).unwrap();
    assert_eq!(world.engine().resources.buffers.len(), before + 4);

    world.remove_component(geometry, false).unwrap();
    assert_eq!(world.engine().resources.buffers.len(), before);
}

#[test]
fn shared_native_material_is_released_once() {
    let mut world = new_world();
    let first = world.create_material("m", ShadingModel::Lit).unwrap();
    let native = world.get_material_res(first).unwrap().native;
    let alias = world
        .register_material("alias", native, ShadingModel::Lit, Ownership::USER)
        .unwrap();

    world.remove_component(first, false).unwrap();
    assert!(world.engine().resources.materials.contains_key(native));

    world.remove_component(alias, false).unwrap();
    assert!(!world.engine().resources.materials.contains_key(native));
}

// ============================================================================
// Assets
// ============================================================================

#[test]
fn asset_removal_takes_its_ownership_set() {
    let mut world = new_world();
    let asset = world.create_asset("crate", "crate.gltf").unwrap();
    let material = world.create_material("m", ShadingModel::Lit).unwrap();
    let mi = world.create_material_instance("mi", material).unwrap();
    let geometry = world.create_geometry("g", &[triangle()]).unwrap();
    for vid in [material, mi, geometry] {
        world.adopt_into_asset(asset, vid).unwrap();
    }
    let actor = world.create_actor("a", geometry, &[mi]).unwrap();

    // The material cascade removes `mi` before the asset loop reaches it.
    world.remove_component(asset, false).unwrap();

    for vid in [asset, material, mi, geometry] {
        assert!(!world.contains(vid), "{vid:?} should be gone");
    }
    let record = world.get_actor_res(actor).unwrap();
    assert_eq!(record.geometry, INVALID_VID);
    assert_eq!(record.material_instances, vec![INVALID_VID]);
    world.check_consistency().unwrap();
}

// ============================================================================
// Scenes & release
// ============================================================================

#[test]
fn scene_removal_keeps_contents() {
    let mut world = new_world();
    let scene = world.create_scene("s").unwrap();
    let a = world.create_actor("a", INVALID_VID, &[]).unwrap();
    let camera = world.create_camera("cam", Projection::default()).unwrap();
    world.append_scene_entity_to_parent(a, scene).unwrap();
    world.append_scene_entity_to_parent(camera, scene).unwrap();

    world.remove_component(scene, false).unwrap();

    assert!(!world.contains(scene));
    assert!(world.contains(a));
    assert!(world.contains(camera));
    assert_eq!(world.membership(a), Some(INVALID_VID));
    assert_eq!(world.membership(camera), Some(INVALID_VID));
    assert_eq!(world.engine().scene_count(), 0);
    world.check_consistency().unwrap();
}

#[test]
fn remove_scene_rejects_other_kinds() {
    let mut world = new_world();
    let a = world.create_actor("a", INVALID_VID, &[]).unwrap();
    assert!(matches!(
        world.remove_scene(a),
        Err(RegistryError::KindMismatch { .. })
    ));
}

#[test]
fn release_all_empties_the_world() -> anyhow::Result<()> {
    let mut world = World::new(RegistrySettings::default())?;
    let scene = world.create_scene("s")?;
    let asset = world.create_asset("rig", "rig.gltf")?;
    let bone = world.create_bone("root", INVALID_VID)?;
    world.adopt_into_asset(asset, bone)?;
    let skeleton = world.create_skeleton("rig", &[bone])?;
    let loose_bone = world.create_bone("loose", INVALID_VID)?;
    world.create_skeleton("loose", &[loose_bone])?;
    let camera = world.create_camera("cam", Projection::default())?;
    world.create_camera_helper(camera)?;
    world.append_scene_entity_to_parent(camera, scene)?;
    world.adopt_into_asset(asset, skeleton)?;

    world.release_all()?;

    assert!(world.is_empty());
    assert_eq!(world.engine().entities.len(), 0);
    assert_eq!(world.engine().resources.live_count(), 0);
    assert_eq!(world.system_resources().material, INVALID_VID);
    Ok(())
}
