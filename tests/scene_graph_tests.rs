//! Scene Graph Tests
//!
//! Tests for `World::append_scene_entity_to_parent`:
//! - entity under entity (across scenes, same scene, unplaced)
//! - whole scene under an entity
//! - entity into a scene
//! - scene merged into scene
//! - rejected edits (self append, cycles, unknown VIDs)

use scene_registry::{
    INVALID_VID, LightKind, Projection, RegistryError, RegistrySettings, ShadingModel, Vid, World,
};

fn new_world() -> World {
    let _ = env_logger::builder().is_test(true).try_init();
    World::new(RegistrySettings::bare()).unwrap()
}

fn actor(world: &mut World, name: &str) -> Vid {
    world.create_actor(name, INVALID_VID, &[]).unwrap()
}

fn in_native_scene(world: &World, scene: Vid, vid: Vid) -> bool {
    world
        .native_scene(scene)
        .is_some_and(|s| s.has_entity(vid))
}

// ============================================================================
// Entity -> Scene
// ============================================================================

#[test]
fn entity_into_scene_places_whole_subtree() {
    let mut world = new_world();
    let scene = world.create_scene("s").unwrap();
    let root = actor(&mut world, "root");
    let child = actor(&mut world, "child");
    world.append_scene_entity_to_parent(child, root).unwrap();

    world.append_scene_entity_to_parent(root, scene).unwrap();

    assert_eq!(world.scene_of(root), scene);
    assert_eq!(world.scene_of(child), scene);
    assert!(in_native_scene(&world, scene, root));
    assert!(in_native_scene(&world, scene, child));
    // Local hierarchy untouched.
    assert_eq!(world.parent_of(child), root);
    assert_eq!(world.parent_of(root), INVALID_VID);
    world.check_consistency().unwrap();
}

#[test]
fn entity_into_other_scene_leaves_the_old_one() {
    let mut world = new_world();
    let s1 = world.create_scene("s1").unwrap();
    let s2 = world.create_scene("s2").unwrap();
    let light = world.create_light("l", LightKind::Directional).unwrap();

    world.append_scene_entity_to_parent(light, s1).unwrap();
    world.append_scene_entity_to_parent(light, s2).unwrap();

    assert_eq!(world.membership(light), Some(s2));
    assert!(!in_native_scene(&world, s1, light));
    assert!(in_native_scene(&world, s2, light));
    assert!(world.scene_members(s1).is_empty());
    assert_eq!(world.scene_members(s2), vec![light]);
    world.check_consistency().unwrap();
}

// ============================================================================
// Entity -> Entity
// ============================================================================

#[test]
fn entity_under_entity_in_other_scene_moves_scene() {
    let mut world = new_world();
    let s1 = world.create_scene("s1").unwrap();
    let s2 = world.create_scene("s2").unwrap();
    let a = actor(&mut world, "a");
    let b = actor(&mut world, "b");
    let c = actor(&mut world, "c");
    let d = actor(&mut world, "d");
    world.append_scene_entity_to_parent(b, a).unwrap();
    world.append_scene_entity_to_parent(c, b).unwrap();
    world.append_scene_entity_to_parent(a, s1).unwrap();
    world.append_scene_entity_to_parent(d, s2).unwrap();

    world.append_scene_entity_to_parent(a, d).unwrap();

    assert_eq!(world.parent_of(a), d);
    assert_eq!(world.children_of(d), vec![a]);
    assert_eq!(world.parent_of(b), a);
    assert_eq!(world.parent_of(c), b);
    for moved in [a, b, c] {
        assert_eq!(world.membership(moved), Some(s2));
        assert!(in_native_scene(&world, s2, moved));
        assert!(!in_native_scene(&world, s1, moved));
    }
    assert!(world.scene_members(s1).is_empty());
    world.check_consistency().unwrap();
}

#[test]
fn entity_under_unplaced_entity_leaves_its_scene() {
    let mut world = new_world();
    let scene = world.create_scene("s").unwrap();
    let a = actor(&mut world, "a");
    let loose = actor(&mut world, "loose");
    world.append_scene_entity_to_parent(a, scene).unwrap();

    world.append_scene_entity_to_parent(a, loose).unwrap();

    assert_eq!(world.parent_of(a), loose);
    assert_eq!(world.membership(a), Some(INVALID_VID));
    assert!(!in_native_scene(&world, scene, a));
    world.check_consistency().unwrap();
}

#[test]
fn entities_of_the_same_scene_are_not_reparented() {
    let mut world = new_world();
    let scene = world.create_scene("s").unwrap();
    let a = actor(&mut world, "a");
    let b = actor(&mut world, "b");
    world.append_scene_entity_to_parent(a, scene).unwrap();
    world.append_scene_entity_to_parent(b, scene).unwrap();

    world.append_scene_entity_to_parent(a, b).unwrap();

    assert_eq!(world.parent_of(a), INVALID_VID);
    assert_eq!(world.scene_of(a), scene);
    assert!(in_native_scene(&world, scene, a));
    world.check_consistency().unwrap();
}

#[test]
fn unplaced_entities_are_reparented() {
    let mut world = new_world();
    let a = actor(&mut world, "a");
    let b = actor(&mut world, "b");

    world.append_scene_entity_to_parent(a, b).unwrap();

    assert_eq!(world.parent_of(a), b);
    assert_eq!(world.membership(a), Some(INVALID_VID));
}

#[test]
fn cycle_is_rejected_without_changes() {
    let mut world = new_world();
    let a = actor(&mut world, "a");
    let b = actor(&mut world, "b");
    let c = actor(&mut world, "c");
    world.append_scene_entity_to_parent(b, a).unwrap();
    world.append_scene_entity_to_parent(c, b).unwrap();

    let err = world.append_scene_entity_to_parent(a, c).unwrap_err();
    assert!(matches!(err, RegistryError::HierarchyCycle { child, parent } if child == a && parent == c));
    assert_eq!(world.parent_of(a), INVALID_VID);
    assert_eq!(world.parent_of(c), b);
}

// ============================================================================
// Scene -> Entity
// ============================================================================

#[test]
fn scene_under_entity_reparents_scene_roots() {
    let mut world = new_world();
    let s1 = world.create_scene("s1").unwrap();
    let s2 = world.create_scene("s2").unwrap();
    let x = actor(&mut world, "x");
    let y = actor(&mut world, "y");
    let camera = world.create_camera("cam", Projection::default()).unwrap();
    let anchor = actor(&mut world, "anchor");
    world.append_scene_entity_to_parent(y, x).unwrap();
    world.append_scene_entity_to_parent(x, s1).unwrap();
    world.append_scene_entity_to_parent(camera, s1).unwrap();
    world.append_scene_entity_to_parent(anchor, s2).unwrap();

    world.append_scene_entity_to_parent(s1, anchor).unwrap();

    assert_eq!(world.parent_of(x), anchor);
    assert_eq!(world.parent_of(camera), anchor);
    assert_eq!(world.parent_of(y), x);
    for moved in [x, y, camera] {
        assert_eq!(world.scene_of(moved), s2);
    }
    // The source scene survives, empty.
    assert!(world.contains(s1));
    assert_eq!(world.native_scene(s1).unwrap().entity_count(), 0);
    world.check_consistency().unwrap();
}

#[test]
fn scene_under_its_own_entity_is_a_cycle() {
    let mut world = new_world();
    let scene = world.create_scene("s").unwrap();
    let root = actor(&mut world, "root");
    let leaf = actor(&mut world, "leaf");
    world.append_scene_entity_to_parent(leaf, root).unwrap();
    world.append_scene_entity_to_parent(root, scene).unwrap();

    let err = world.append_scene_entity_to_parent(scene, leaf).unwrap_err();
    assert!(matches!(err, RegistryError::HierarchyCycle { .. }));
    assert_eq!(world.parent_of(root), INVALID_VID);
    assert_eq!(world.scene_of(leaf), scene);
}

// ============================================================================
// Scene -> Scene
// ============================================================================

#[test]
fn scene_into_scene_merges_and_destroys_source() {
    let mut world = new_world();
    let s1 = world.create_scene("s1").unwrap();
    let s2 = world.create_scene("s2").unwrap();
    let x = actor(&mut world, "x");
    let y = world.create_light("y", LightKind::Directional).unwrap();
    let z = actor(&mut world, "z");
    world.append_scene_entity_to_parent(x, s1).unwrap();
    world.append_scene_entity_to_parent(y, s1).unwrap();
    world.append_scene_entity_to_parent(z, s2).unwrap();

    world.append_scene_entity_to_parent(s1, s2).unwrap();

    assert!(!world.contains(s1));
    assert!(world.get_scene_res(s1).is_none());
    for member in [x, y, z] {
        assert_eq!(world.membership(member), Some(s2));
        assert!(in_native_scene(&world, s2, member));
    }
    let mut expected = vec![x, y, z];
    expected.sort_unstable();
    assert_eq!(world.scene_members(s2), expected);
    assert_eq!(world.native_scene(s2).unwrap().entity_count(), 3);
    world.check_consistency().unwrap();
}

// ============================================================================
// Rejected input & bones
// ============================================================================

#[test]
fn self_append_is_rejected() {
    let mut world = new_world();
    let a = actor(&mut world, "a");
    let err = world.append_scene_entity_to_parent(a, a).unwrap_err();
    assert!(matches!(err, RegistryError::SelfAppend(v) if v == a));
}

#[test]
fn non_node_vids_are_not_found() {
    let mut world = new_world();
    let a = actor(&mut world, "a");
    let material = world.create_material("m", ShadingModel::Lit).unwrap();
    let ghost = Vid::from_parts(999, 0);

    assert!(matches!(
        world.append_scene_entity_to_parent(a, material),
        Err(RegistryError::NotFound(v)) if v == material
    ));
    assert!(matches!(
        world.append_scene_entity_to_parent(ghost, a),
        Err(RegistryError::NotFound(v)) if v == ghost
    ));
}

#[test]
fn bones_follow_their_actor_without_membership() {
    let mut world = new_world();
    let scene = world.create_scene("s").unwrap();
    let body = actor(&mut world, "body");
    let bone = world.create_bone("spine", INVALID_VID).unwrap();
    world.append_scene_entity_to_parent(body, scene).unwrap();

    world.append_scene_entity_to_parent(bone, body).unwrap();

    assert_eq!(world.parent_of(bone), body);
    assert_eq!(world.membership(bone), None);
    assert!(in_native_scene(&world, scene, bone));
    world.check_consistency().unwrap();
}

#[test]
fn repeated_placement_is_idempotent() {
    let mut world = new_world();
    let scene = world.create_scene("s").unwrap();
    let a = actor(&mut world, "a");

    world.append_scene_entity_to_parent(a, scene).unwrap();
    world.append_scene_entity_to_parent(a, scene).unwrap();

    assert_eq!(world.native_scene(scene).unwrap().entity_count(), 1);
    assert_eq!(world.scene_members(scene), vec![a]);

    world.remove_scene(scene).unwrap();
    assert_eq!(world.membership(a), Some(INVALID_VID));
    assert_eq!(world.scene_of(a), INVALID_VID);
    world.check_consistency().unwrap();
}
