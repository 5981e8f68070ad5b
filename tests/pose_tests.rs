//! Pose application tests
//!
//! Tests for:
//! - Idempotence and partial application
//! - Unknown bone names
//! - Rotation order
//! - Instance-level `set_pose`

mod common;

use common::*;
use glam::{EulerRot, Quat};
use troupe::character::{
    AssetCloner, CharacterInstance, CharacterProps, CharacterSettings, EulerAngles, Pose,
    RotationOrder,
};
use troupe::scene::{Scene, SkeletonKey};

fn cloned_rig(scene: &mut Scene) -> SkeletonKey {
    let asset = humanoid_asset();
    let cloned = AssetCloner::clone(&asset, scene).unwrap();
    cloned.skinned_meshes[0].1
}

fn rotations(scene: &Scene, key: SkeletonKey) -> Vec<Quat> {
    let skeleton = scene.get_skeleton(key).unwrap();
    skeleton
        .bones
        .iter()
        .map(|&h| scene.get_node(h).unwrap().transform.rotation)
        .collect()
}

#[test]
fn applying_twice_equals_applying_once() {
    let mut scene = Scene::new();
    let key = cloned_rig(&mut scene);
    let pose = Pose::new()
        .with_bone("hips", EulerAngles::new(0.1, 0.2, 0.3))
        .with_bone("head", EulerAngles::new(-0.4, 0.0, 0.25));

    assert_eq!(pose.apply(&mut scene, key, RotationOrder::Xyz), 2);
    let once = rotations(&scene, key);

    assert_eq!(pose.apply(&mut scene, key, RotationOrder::Xyz), 2);
    let twice = rotations(&scene, key);

    assert_eq!(once, twice);
}

#[test]
fn partial_pose_touches_only_named_bones() {
    let mut scene = Scene::new();
    let key = cloned_rig(&mut scene);

    let spine = scene.get_skeleton(key).unwrap().bone_by_name("spine").unwrap();
    let preset = Quat::from_rotation_z(0.7);
    scene.get_node_mut(spine).unwrap().transform.rotation = preset;

    let pose = Pose::new().with_bone("head", EulerAngles::new(0.2, 0.0, 0.0));
    pose.apply(&mut scene, key, RotationOrder::Xyz);

    let after = rotations(&scene, key);
    assert!(after[0].abs_diff_eq(Quat::IDENTITY, EPSILON));
    assert!(after[1].abs_diff_eq(preset, EPSILON));
    assert!(after[2].abs_diff_eq(Quat::from_rotation_x(0.2), EPSILON));
}

#[test]
fn unknown_bone_is_skipped_silently() {
    let mut asset = humanoid_asset();
    asset.nodes[3].name = "skull".into();
    asset.skeletons[0].bone_names[2] = "skull".into();

    let mut scene = Scene::new();
    let cloned = AssetCloner::clone(&asset, &mut scene).unwrap();
    let key = cloned.skinned_meshes[0].1;
    let before = rotations(&scene, key);

    let pose = Pose::new().with_bone("head", EulerAngles::new(0.2, 0.0, 0.0));
    assert_eq!(pose.apply(&mut scene, key, RotationOrder::Xyz), 0);

    assert_eq!(rotations(&scene, key), before);
}

#[test]
fn mixed_pose_applies_known_bones() {
    let mut scene = Scene::new();
    let key = cloned_rig(&mut scene);

    let pose = Pose::new()
        .with_bone("tail", EulerAngles::new(1.0, 0.0, 0.0))
        .with_bone("spine", EulerAngles::new(0.0, 0.5, 0.0));

    assert_eq!(pose.apply(&mut scene, key, RotationOrder::Xyz), 1);
    assert!(rotations(&scene, key)[1].abs_diff_eq(Quat::from_rotation_y(0.5), EPSILON));
}

#[test]
fn rotation_order_is_honoured() {
    let mut scene = Scene::new();
    let key = cloned_rig(&mut scene);
    let angles = EulerAngles::new(0.3, 0.6, 0.9);

    Pose::new().with_bone("hips", angles).apply(&mut scene, key, RotationOrder::Yxz);

    // YXZ: yaw first, then pitch, then roll
    let expected = Quat::from_euler(EulerRot::YXZ, 0.6, 0.3, 0.9);
    assert!(rotations(&scene, key)[0].abs_diff_eq(expected, EPSILON));
}

#[test]
fn pose_on_removed_skeleton_does_nothing() {
    let mut scene = Scene::new();
    let key = cloned_rig(&mut scene);
    scene.remove_skeleton(key);

    let pose = Pose::new().with_bone("hips", EulerAngles::new(0.1, 0.0, 0.0));
    assert_eq!(pose.apply(&mut scene, key, RotationOrder::Xyz), 0);
}

#[test]
fn empty_pose_on_instance_keeps_rotations() {
    let mut scene = Scene::new();
    let props = CharacterProps {
        pose: Pose::new().with_bone("head", EulerAngles::new(0.2, 0.0, 0.0)),
        ..CharacterProps::new("c1")
    };
    let mut instance =
        CharacterInstance::spawn(&mut scene, shared_humanoid(), &props, &CharacterSettings::default())
            .unwrap();

    assert_eq!(instance.set_pose(&mut scene, &Pose::new()), 0);

    let head = scene.get_skeleton(instance.skeleton()).unwrap().bone_by_name("head").unwrap();
    let rotation = scene.get_node(head).unwrap().transform.rotation;
    assert!(rotation.abs_diff_eq(Quat::from_rotation_x(0.2), EPSILON));
}

#[test]
fn instance_uses_configured_order() {
    let settings = CharacterSettings {
        rotation_order: RotationOrder::Zyx,
        ..CharacterSettings::default()
    };
    let mut scene = Scene::new();
    let mut instance =
        CharacterInstance::spawn(&mut scene, shared_humanoid(), &CharacterProps::new("c1"), &settings)
            .unwrap();

    let angles = EulerAngles::new(0.1, 0.2, 0.3);
    assert_eq!(instance.set_pose(&mut scene, &Pose::new().with_bone("spine", angles)), 1);

    let spine = scene.get_skeleton(instance.skeleton()).unwrap().bone_by_name("spine").unwrap();
    let rotation = scene.get_node(spine).unwrap().transform.rotation;
    assert!(rotation.abs_diff_eq(Quat::from_euler(EulerRot::ZYX, 0.3, 0.2, 0.1), EPSILON));
}
