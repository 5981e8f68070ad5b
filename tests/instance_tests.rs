//! CharacterInstance integration tests
//!
//! Tests for:
//! - Setup: mesh search, material override, morph slots, bone re-parenting
//! - Group user data
//! - Position, facing and height synchronization
//! - Asset rebuild and despawn

mod common;

use std::sync::Arc;

use common::*;
use glam::{Mat4, Quat, Vec3, Vec4};
use troupe::assets::{AssetNode, CharacterAsset};
use troupe::character::{
    CharacterInstance, CharacterProps, CharacterSettings, EulerAngles, MorphWeights, Pose,
    WorldPosition, Yaw,
};
use troupe::errors::TroupeError;
use troupe::resources::{Geometry, Mesh, MeshBasicMaterial, Texture};
use troupe::scene::Scene;

fn props(id: &str) -> CharacterProps {
    CharacterProps {
        character_type: "adult-female".into(),
        morph_weights: MorphWeights::new(0.5, 0.25, 0.1),
        ..CharacterProps::new(id)
    }
}

fn spawn(scene: &mut Scene, props: &CharacterProps) -> CharacterInstance {
    CharacterInstance::spawn(scene, shared_humanoid(), props, &CharacterSettings::default())
        .unwrap()
}

// ============================================================================
// Setup
// ============================================================================

#[test]
fn spawn_keeps_only_group_mesh_and_bones() {
    let mut scene = Scene::new();
    let instance = spawn(&mut scene, &props("c1"));

    let group = scene.get_node(instance.group()).unwrap();
    assert_eq!(group.children(), &[instance.mesh()]);
    assert_eq!(scene.get_name(instance.group()), Some("c1"));
    assert_eq!(scene.get_name(instance.mesh()), Some("body"));

    // group + body + hips/spine/head
    assert_eq!(scene.nodes.len(), 5);
    assert_eq!(scene.root_nodes, vec![instance.group()]);
    assert_eq!(scene.meshes.len(), 1);
    assert_eq!(scene.skins.len(), 1);
}

#[test]
fn root_bone_moves_under_mesh() {
    let mut scene = Scene::new();
    let instance = spawn(&mut scene, &props("c1"));

    let skeleton = scene.get_skeleton(instance.skeleton()).unwrap();
    let hips = skeleton.root_bone().unwrap();
    assert_eq!(scene.get_node(hips).unwrap().parent(), Some(instance.mesh()));
    for &bone in &skeleton.bones {
        assert!(scene.is_descendant_of(bone, instance.mesh()));
    }
    assert_eq!(scene.get_skin(instance.mesh()).unwrap().skeleton, instance.skeleton());
}

#[test]
fn material_is_replaced_by_toon_with_color_map() {
    let asset = shared_humanoid();
    let source_texture = asset.nodes[4]
        .mesh
        .as_ref()
        .unwrap()
        .material
        .data
        .map()
        .texture
        .clone()
        .unwrap();

    let mut scene = Scene::new();
    let instance = CharacterInstance::spawn(
        &mut scene,
        Arc::clone(&asset),
        &props("c1"),
        &CharacterSettings::default(),
    )
    .unwrap();

    let mesh = scene.get_mesh(instance.mesh()).unwrap();
    let toon = mesh.material.as_toon().expect("toon material");
    assert!(toon.skinning());
    assert!(toon.morph_targets());
    assert!(toon.morph_normals());
    assert!(!toon.flat_shading());
    assert!(approx_eq(toon.shininess(), 0.0));
    assert_eq!(toon.color(), glam::Vec4::ONE);

    let map = toon.map();
    assert!(Arc::ptr_eq(map.texture.as_ref().unwrap(), &source_texture));
    assert!(map.version > 0, "map must be flagged for upload");

    // The asset still carries its own material
    assert!(asset.nodes[4].mesh.as_ref().unwrap().material.as_standard().is_some());
}

#[test]
fn material_without_map_gets_none() {
    let mut asset = humanoid_asset();
    let body = asset.nodes[4].mesh.as_mut().unwrap();
    body.material = MeshBasicMaterial::new(Vec4::new(1.0, 0.0, 0.0, 1.0)).into();

    let mut scene = Scene::new();
    let instance = CharacterInstance::spawn(
        &mut scene,
        asset.into_shared(),
        &props("c1"),
        &CharacterSettings::default(),
    )
    .unwrap();

    let toon = scene.get_mesh(instance.mesh()).unwrap().material.as_toon().unwrap();
    assert!(!toon.map().is_some());
    assert_eq!(toon.color(), Vec4::ONE);
}

#[test]
fn unlit_source_material_hands_over_its_map() {
    let texture = Arc::new(Texture::new_2d(Some("flat"), 64, 64));
    let mut basic = MeshBasicMaterial::default();
    basic.set_map(Some(Arc::clone(&texture)));

    let mut asset = humanoid_asset();
    asset.nodes[4].mesh.as_mut().unwrap().material = basic.into();

    let mut scene = Scene::new();
    let instance = CharacterInstance::spawn(
        &mut scene,
        asset.into_shared(),
        &props("c1"),
        &CharacterSettings::default(),
    )
    .unwrap();

    let toon = scene.get_mesh(instance.mesh()).unwrap().material.as_toon().unwrap();
    assert!(Arc::ptr_eq(toon.map().texture.as_ref().unwrap(), &texture));
}

#[test]
fn morph_weights_fill_slots_in_order() {
    let mut scene = Scene::new();
    let mut instance = spawn(&mut scene, &props("c1"));

    let mesh = scene.get_mesh(instance.mesh()).unwrap();
    assert_eq!(mesh.morph_target_influences(), &[0.5, 0.25, 0.1]);

    instance.set_morph_weights(&mut scene, MorphWeights::new(0.0, 1.0, 0.0));
    let mesh = scene.get_mesh(instance.mesh()).unwrap();
    assert_eq!(mesh.morph_target_influences(), &[0.0, 1.0, 0.0]);
}

#[test]
fn morph_slots_grow_for_geometry_without_targets() {
    let mut asset = humanoid_asset();
    let body = asset.nodes[4].mesh.as_mut().unwrap();
    let geometry = Arc::new(Geometry::new(body.geometry.positions().to_vec()));
    *body = Mesh::new(geometry, body.material.clone()).with_name("body");
    assert!(body.morph_target_influences().is_empty());

    let mut scene = Scene::new();
    let instance = CharacterInstance::spawn(
        &mut scene,
        asset.into_shared(),
        &props("c1"),
        &CharacterSettings::default(),
    )
    .unwrap();

    let mesh = scene.get_mesh(instance.mesh()).unwrap();
    assert_eq!(mesh.morph_target_influences(), &[0.5, 0.25, 0.1]);
}

#[test]
fn user_data_describes_character() {
    let mut scene = Scene::new();
    let instance = spawn(&mut scene, &props("c1"));

    let data = scene.get_user_data(instance.group()).unwrap();
    assert_eq!(data.id, "c1");
    assert_eq!(data.character_type, "adult-female");
    assert!(data.model_settings.is_empty());
    assert_eq!(data.skeleton, Some(instance.skeleton()));
}

#[test]
fn top_level_mesh_is_found() {
    let mut scene = Scene::new();
    let instance = CharacterInstance::spawn(
        &mut scene,
        flat_humanoid_asset().into_shared(),
        &props("c1"),
        &CharacterSettings::default(),
    )
    .unwrap();

    assert_eq!(scene.get_name(instance.mesh()), Some("body"));
    let skeleton = scene.get_skeleton(instance.skeleton()).unwrap();
    assert_eq!(
        scene.get_node(skeleton.root_bone().unwrap()).unwrap().parent(),
        Some(instance.mesh())
    );
    assert_eq!(scene.nodes.len(), 5);
}

#[test]
fn asset_without_skinned_mesh_is_missing_mesh() {
    let mut scene = Scene::new();
    let result = CharacterInstance::spawn(
        &mut scene,
        static_asset().into_shared(),
        &props("c1"),
        &CharacterSettings::default(),
    );

    assert!(matches!(result, Err(TroupeError::MissingMesh { ref asset }) if asset == "statue"));
    assert!(scene.nodes.is_empty());
    assert!(scene.meshes.is_empty());
}

#[test]
fn mesh_nested_too_deep_is_missing_mesh() {
    let mut asset = CharacterAsset::new("deep");
    let scene_root = asset.add_root(AssetNode::new("Scene"));
    let armature = asset.add_child(scene_root, AssetNode::new("Armature")).unwrap();
    asset
        .add_child(armature, AssetNode::bone("hips", translation(0.0, 1.0, 0.0)))
        .unwrap();
    asset
        .add_child(armature, AssetNode::skinned_mesh("body", body_mesh(), 0))
        .unwrap();
    asset.add_skeleton_from_rest_pose("rig", &["hips"]).unwrap();

    let mut scene = Scene::new();
    let result = CharacterInstance::spawn(
        &mut scene,
        asset.into_shared(),
        &props("c1"),
        &CharacterSettings::default(),
    );

    assert!(matches!(result, Err(TroupeError::MissingMesh { .. })));
    assert!(scene.nodes.is_empty());
    assert!(scene.skins.is_empty());
}

#[test]
fn bind_failure_surfaces_from_spawn() {
    let mut asset = humanoid_asset();
    asset.skeletons[0].bone_names[1] = "chest".into();

    let mut scene = Scene::new();
    let result = CharacterInstance::spawn(
        &mut scene,
        asset.into_shared(),
        &props("c1"),
        &CharacterSettings::default(),
    );

    assert!(matches!(result, Err(TroupeError::SkeletonBind { ref bone, .. }) if bone == "chest"));
    assert!(scene.nodes.is_empty());
}

// ============================================================================
// Bind pose
// ============================================================================

fn rotated_armature_asset() -> CharacterAsset {
    let mut asset = humanoid_asset();
    asset.nodes[0].transform.rotation = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
    asset.skeletons.clear();
    asset.add_skeleton_from_rest_pose("rig", &BONES).unwrap();
    asset
}

#[test]
fn rebind_makes_setup_pose_the_rest_pose() {
    let mut scene = Scene::new();
    let instance = CharacterInstance::spawn(
        &mut scene,
        rotated_armature_asset().into_shared(),
        &props("c1"),
        &CharacterSettings::default(),
    )
    .unwrap();

    scene.update();
    let skeleton = scene.get_skeleton(instance.skeleton()).unwrap();
    for joint in skeleton.joint_matrices() {
        assert!(joint.abs_diff_eq(Mat4::IDENTITY, EPSILON));
    }
}

#[test]
fn authored_bind_matrices_can_be_kept() {
    let settings = CharacterSettings {
        rebind_from_rest_pose: false,
        ..CharacterSettings::default()
    };
    let asset = rotated_armature_asset().into_shared();

    let mut scene = Scene::new();
    let instance =
        CharacterInstance::spawn(&mut scene, Arc::clone(&asset), &props("c1"), &settings).unwrap();

    let skeleton = scene.get_skeleton(instance.skeleton()).unwrap();
    assert_eq!(
        skeleton.inverse_bind_matrices(),
        &asset.skeletons[0].inverse_bind_matrices[..]
    );

    scene.update();
    let skeleton = scene.get_skeleton(instance.skeleton()).unwrap();
    assert!(!skeleton.joint_matrices()[0].abs_diff_eq(Mat4::IDENTITY, EPSILON));
}

#[test]
fn initial_pose_is_applied() {
    let mut scene = Scene::new();
    let props = CharacterProps {
        pose: Pose::new().with_bone("head", EulerAngles::new(0.2, 0.0, 0.0)),
        ..props("c1")
    };
    let instance = spawn(&mut scene, &props);

    let head = scene.get_skeleton(instance.skeleton()).unwrap().bone_by_name("head").unwrap();
    let rotation = scene.get_node(head).unwrap().transform.rotation;
    assert!(rotation.abs_diff_eq(Quat::from_rotation_x(0.2), EPSILON));
}

// ============================================================================
// Synchronization
// ============================================================================

#[test]
fn position_swaps_vertical_and_depth() {
    let mut scene = Scene::new();
    let props = CharacterProps {
        position: WorldPosition::new(1.0, 2.0, 3.0),
        ..props("c1")
    };
    let instance = spawn(&mut scene, &props);

    let position = scene.get_node(instance.group()).unwrap().transform.position;
    assert!(vec3_approx(position, Vec3::new(1.0, 3.0, 2.0)));

    instance.set_position(&mut scene, WorldPosition::new(-4.0, 0.5, 0.0));
    let position = scene.get_node(instance.group()).unwrap().transform.position;
    assert!(vec3_approx(position, Vec3::new(-4.0, 0.0, 0.5)));
}

#[test]
fn facing_accepts_scalar_and_vector() {
    let mut scene = Scene::new();
    let instance = spawn(&mut scene, &props("c1"));

    instance.set_facing(&mut scene, Yaw::Scalar(1.0));
    let rotation = scene.get_node(instance.group()).unwrap().transform.rotation;
    assert!(rotation.abs_diff_eq(Quat::from_rotation_y(1.0), EPSILON));

    instance.set_facing(&mut scene, Yaw::Vector { x: 0.0, y: 2.5, z: 0.0 });
    let rotation = scene.get_node(instance.group()).unwrap().transform.rotation;
    assert!(rotation.abs_diff_eq(Quat::from_rotation_y(2.5), EPSILON));
}

#[test]
fn zero_facing_resets_rotation() {
    let mut scene = Scene::new();
    let instance = spawn(&mut scene, &props("c1"));

    instance.set_facing(&mut scene, Yaw::Scalar(1.0));
    instance.set_facing(&mut scene, Yaw::Vector { x: 0.0, y: 0.0, z: 0.0 });

    let rotation = scene.get_node(instance.group()).unwrap().transform.rotation;
    assert!(rotation.abs_diff_eq(Quat::IDENTITY, EPSILON));
}

#[test]
fn height_scales_uniformly() {
    let mut scene = Scene::new();
    let mut instance = spawn(&mut scene, &props("c1"));

    // Body geometry is 2.0 tall
    let scale = instance.set_height(&mut scene, 1.8).unwrap();
    assert!(approx_eq(scale, 0.9));

    let applied = scene.get_node(instance.group()).unwrap().transform.scale;
    assert!(vec3_approx(applied, Vec3::splat(0.9)));
    assert_eq!(instance.target_height(), Some(1.8));
}

#[test]
fn height_does_not_compound_with_previous_scale() {
    let mut scene = Scene::new();
    let mut instance = spawn(&mut scene, &props("c1"));

    instance.set_height(&mut scene, 1.0);
    scene.update();
    let scale = instance.set_height(&mut scene, 1.0).unwrap();
    assert!(approx_eq(scale, 0.5));

    let scale = instance.set_height(&mut scene, 3.0).unwrap();
    assert!(approx_eq(scale, 1.5));
}

#[test]
fn height_from_props_is_applied_at_spawn() {
    let mut scene = Scene::new();
    let props = CharacterProps {
        height: Some(4.0),
        ..props("c1")
    };
    let instance = spawn(&mut scene, &props);

    let applied = scene.get_node(instance.group()).unwrap().transform.scale;
    assert!(vec3_approx(applied, Vec3::splat(2.0)));

    scene.update();
    let bounds = scene.world_bounds(instance.group()).unwrap();
    assert!(approx_eq(bounds.height(), 4.0));
}

#[test]
fn flat_bounds_leave_scale_unchanged() {
    let mut asset = humanoid_asset();
    let body = asset.nodes[4].mesh.as_mut().unwrap();
    body.geometry = Arc::new(
        Geometry::new(vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)])
            .with_morph_targets(["mesomorphic", "ectomorphic", "endomorphic"]),
    );

    let mut scene = Scene::new();
    let mut instance = CharacterInstance::spawn(
        &mut scene,
        asset.into_shared(),
        &props("c1"),
        &CharacterSettings::default(),
    )
    .unwrap();

    assert!(instance.set_height(&mut scene, 1.8).is_none());
    let applied = scene.get_node(instance.group()).unwrap().transform.scale;
    assert!(vec3_approx(applied, Vec3::ONE));
}

// ============================================================================
// Rebuild & despawn
// ============================================================================

#[test]
fn same_asset_does_not_rebuild() {
    let asset = shared_humanoid();
    let mut scene = Scene::new();
    let mut instance = CharacterInstance::spawn(
        &mut scene,
        Arc::clone(&asset),
        &props("c1"),
        &CharacterSettings::default(),
    )
    .unwrap();

    let mesh = instance.mesh();
    assert!(!instance.set_asset(&mut scene, asset).unwrap());
    assert_eq!(instance.mesh(), mesh);
}

#[test]
fn edited_copy_of_asset_is_a_new_asset() {
    let asset = shared_humanoid();
    let mut scene = Scene::new();
    let mut instance = CharacterInstance::spawn(
        &mut scene,
        Arc::clone(&asset),
        &props("c1"),
        &CharacterSettings::default(),
    )
    .unwrap();

    // Same id, different contents
    let mut edited = CharacterAsset::clone(&asset);
    edited.skeletons[0].bone_names[0] = "pelvis".into();
    let edited = edited.into_shared();
    assert_eq!(edited.id, asset.id);
    assert!(!instance.uses_asset(&edited));

    let result = instance.set_asset(&mut scene, edited);
    assert!(matches!(result, Err(TroupeError::SkeletonBind { ref bone, .. }) if bone == "pelvis"));

    let copy = CharacterAsset::clone(&asset).into_shared();
    assert!(instance.set_asset(&mut scene, Arc::clone(&copy)).unwrap());
    assert!(instance.uses_asset(&copy));
}

#[test]
fn new_asset_replaces_rig() {
    let mut scene = Scene::new();
    let props = CharacterProps {
        height: Some(1.0),
        pose: Pose::new().with_bone("spine", EulerAngles::new(0.0, 0.3, 0.0)),
        ..props("c1")
    };
    let mut instance = spawn(&mut scene, &props);
    let old_mesh = instance.mesh();
    let old_skeleton = instance.skeleton();

    let replacement = flat_humanoid_asset().into_shared();
    assert!(instance.set_asset(&mut scene, Arc::clone(&replacement)).unwrap());

    assert_ne!(instance.mesh(), old_mesh);
    assert!(scene.get_node(old_mesh).is_none());
    assert!(scene.get_skeleton(old_skeleton).is_none());
    assert_eq!(instance.asset().id, replacement.id);

    assert_eq!(scene.nodes.len(), 5);
    assert_eq!(scene.skins.len(), 1);
    assert_eq!(
        scene.get_node(instance.group()).unwrap().children(),
        &[instance.mesh()]
    );
    assert_eq!(
        scene.get_user_data(instance.group()).unwrap().skeleton,
        Some(instance.skeleton())
    );

    // Pose and morphs carried over, height re-applied
    let spine = scene.get_skeleton(instance.skeleton()).unwrap().bone_by_name("spine").unwrap();
    let rotation = scene.get_node(spine).unwrap().transform.rotation;
    assert!(rotation.abs_diff_eq(Quat::from_rotation_y(0.3), EPSILON));
    assert_eq!(
        scene.get_mesh(instance.mesh()).unwrap().morph_target_influences(),
        &[0.5, 0.25, 0.1]
    );
    let scale = scene.get_node(instance.group()).unwrap().transform.scale;
    assert!(vec3_approx(scale, Vec3::splat(0.5)));
}

#[test]
fn failed_rebuild_keeps_previous_rig() {
    let mut scene = Scene::new();
    let mut instance = spawn(&mut scene, &props("c1"));
    let mesh = instance.mesh();
    let nodes = scene.nodes.len();

    let mut broken = humanoid_asset();
    broken.skeletons[0].bone_names[0] = "pelvis".into();

    assert!(instance.set_asset(&mut scene, broken.into_shared()).is_err());
    assert_eq!(instance.mesh(), mesh);
    assert_eq!(scene.nodes.len(), nodes);
    assert_eq!(scene.skins.len(), 1);
}

#[test]
fn despawn_releases_everything() {
    let mut scene = Scene::new();
    let instance = spawn(&mut scene, &props("c1"));

    instance.despawn(&mut scene);

    assert!(scene.nodes.is_empty());
    assert!(scene.root_nodes.is_empty());
    assert!(scene.meshes.is_empty());
    assert!(scene.skins.is_empty());
}

#[test]
fn instances_of_one_asset_are_independent() {
    let asset = shared_humanoid();
    let settings = CharacterSettings::default();
    let mut scene = Scene::new();

    let mut a =
        CharacterInstance::spawn(&mut scene, Arc::clone(&asset), &props("a"), &settings).unwrap();
    let b = CharacterInstance::spawn(&mut scene, Arc::clone(&asset), &props("b"), &settings).unwrap();

    a.set_pose(
        &mut scene,
        &Pose::new().with_bone("head", EulerAngles::new(0.1, 0.0, 0.0)),
    );
    a.set_height(&mut scene, 1.0);

    let head_b = scene.get_skeleton(b.skeleton()).unwrap().bone_by_name("head").unwrap();
    assert!(scene.get_node(head_b).unwrap().transform.rotation.abs_diff_eq(Quat::IDENTITY, EPSILON));
    assert!(vec3_approx(scene.get_node(b.group()).unwrap().transform.scale, Vec3::ONE));
}
