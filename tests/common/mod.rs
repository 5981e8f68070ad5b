//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use glam::{Quat, Vec3, Vec4};
use troupe::assets::{AssetNode, CharacterAsset, SharedAsset};
use troupe::resources::{Geometry, Material, Mesh, MeshStandardMaterial, Texture};
use troupe::scene::Transform;

pub const EPSILON: f32 = 1e-5;

pub const BONES: [&str; 3] = ["hips", "spine", "head"];

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

pub fn translation(x: f32, y: f32, z: f32) -> Transform {
    Transform::from_trs(Vec3::new(x, y, z), Quat::IDENTITY, Vec3::ONE)
}

/// A 0.5 x 2.0 x 0.5 box standing on the origin, with three body-shape
/// morph targets.
pub fn body_geometry() -> Arc<Geometry> {
    let positions = vec![
        Vec3::new(-0.25, 0.0, -0.25),
        Vec3::new(0.25, 0.0, 0.25),
        Vec3::new(-0.25, 2.0, 0.25),
        Vec3::new(0.25, 2.0, -0.25),
    ];
    Arc::new(
        Geometry::new(positions)
            .with_name("body")
            .with_morph_targets(["mesomorphic", "ectomorphic", "endomorphic"]),
    )
}

pub fn textured_material() -> (Material, Arc<Texture>) {
    let texture = Arc::new(Texture::new_2d(Some("skin"), 512, 512));
    let mut standard = MeshStandardMaterial::new(Vec4::new(0.8, 0.6, 0.5, 1.0));
    standard.set_roughness(0.3);
    standard.set_map(Some(Arc::clone(&texture)));
    (Material::from(standard).with_name("skin"), texture)
}

pub fn body_mesh() -> Mesh {
    let (material, _) = textured_material();
    Mesh::new(body_geometry(), material).with_name("body")
}

/// `Armature` root holding a `hips > spine > head` bone chain and a skinned
/// `body` mesh bound to it. Inverse bind matrices come from the rest pose.
pub fn humanoid_asset() -> CharacterAsset {
    let mut asset = CharacterAsset::new("humanoid");
    let armature = asset.add_root(AssetNode::new("Armature"));

    let hips = asset
        .add_child(armature, AssetNode::bone("hips", translation(0.0, 1.0, 0.0)))
        .unwrap();
    let spine = asset
        .add_child(hips, AssetNode::bone("spine", translation(0.0, 0.5, 0.0)))
        .unwrap();
    asset
        .add_child(spine, AssetNode::bone("head", translation(0.0, 0.5, 0.0)))
        .unwrap();

    asset
        .add_child(armature, AssetNode::skinned_mesh("body", body_mesh(), 0))
        .unwrap();

    asset.add_skeleton_from_rest_pose("rig", &BONES).unwrap();
    asset
}

pub fn shared_humanoid() -> SharedAsset {
    humanoid_asset().into_shared()
}

/// Same rig with the skinned mesh at the top level.
pub fn flat_humanoid_asset() -> CharacterAsset {
    let mut asset = CharacterAsset::new("flat-humanoid");
    asset.add_root(AssetNode::skinned_mesh("body", body_mesh(), 0));

    let hips = asset.add_root(AssetNode::bone("hips", translation(0.0, 1.0, 0.0)));
    let spine = asset
        .add_child(hips, AssetNode::bone("spine", translation(0.0, 0.5, 0.0)))
        .unwrap();
    asset
        .add_child(spine, AssetNode::bone("head", translation(0.0, 0.5, 0.0)))
        .unwrap();

    asset.add_skeleton_from_rest_pose("rig", &BONES).unwrap();
    asset
}

/// Props-only asset: a static mesh and no skeleton at all.
pub fn static_asset() -> CharacterAsset {
    let mut asset = CharacterAsset::new("statue");
    let root = asset.add_root(AssetNode::new("Root"));
    let mut plinth = AssetNode::new("plinth");
    plinth.mesh = Some(body_mesh());
    asset.add_child(root, plinth).unwrap();
    asset
}
