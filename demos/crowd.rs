//! Spawns a small crowd from one shared asset, moves it around for a few
//! updates and prints what the roster did.
//!
//! Run with `RUST_LOG=debug cargo run --example crowd` to see the lifecycle
//! logs.

use std::sync::Arc;

use glam::{Quat, Vec3, Vec4};
use troupe::assets::{AssetNode, CharacterAsset, SharedAsset};
use troupe::character::{
    CharacterProps, CharacterRoster, CharacterSettings, EulerAngles, MorphWeights, Pose,
    WorldPosition, Yaw,
};
use troupe::resources::{Geometry, Material, Mesh, MeshStandardMaterial, Texture};
use troupe::scene::{Scene, Transform};

fn bone(y: f32) -> Transform {
    Transform::from_trs(Vec3::new(0.0, y, 0.0), Quat::IDENTITY, Vec3::ONE)
}

fn build_asset(name: &str, height: f32) -> anyhow::Result<SharedAsset> {
    let mut asset = CharacterAsset::new(name);
    let armature = asset.add_root(AssetNode::new("Armature"));

    let hips = asset.add_child(armature, AssetNode::bone("hips", bone(height * 0.5)))?;
    let spine = asset.add_child(hips, AssetNode::bone("spine", bone(height * 0.2)))?;
    asset.add_child(spine, AssetNode::bone("head", bone(height * 0.2)))?;

    let geometry = Arc::new(
        Geometry::new(vec![
            Vec3::new(-0.3, 0.0, -0.2),
            Vec3::new(0.3, height, 0.2),
        ])
        .with_morph_targets(["mesomorphic", "ectomorphic", "endomorphic"]),
    );
    let mut material = MeshStandardMaterial::new(Vec4::ONE);
    material.set_map(Some(Arc::new(Texture::new_2d(Some("skin"), 1024, 1024))));
    let mesh = Mesh::new(geometry, Material::from(material)).with_name("body");
    asset.add_child(armature, AssetNode::skinned_mesh("body", mesh, 0))?;

    asset.add_skeleton_from_rest_pose("rig", &["hips", "spine", "head"])?;
    Ok(asset.into_shared())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = CharacterSettings::from_json(r#"{ "toon": { "shininess": 4 } }"#)?;
    let adult = build_asset("adult", 1.75)?;
    let child = build_asset("child", 1.1)?;

    let mut scene = Scene::new();
    let mut roster = CharacterRoster::new(settings);

    let mut crowd: Vec<CharacterProps> = (0..4u8)
        .map(|i| CharacterProps {
            position: WorldPosition::new(f32::from(i) * 1.5, 0.0, 0.0),
            facing_rotation: Yaw::Scalar(0.0),
            height: Some(1.6 + f32::from(i) * 0.1),
            morph_weights: MorphWeights::new(0.25 * f32::from(i), 0.0, 0.0),
            ..CharacterProps::new(&format!("extra-{i}"))
        })
        .collect();

    for frame in 0..3u8 {
        match frame {
            1 => {
                crowd[0].pose = Pose::new().with_bone("head", EulerAngles::new(0.3, 0.0, 0.0));
                crowd[1].position.y = 4.0;
            }
            2 => {
                crowd.pop();
            }
            _ => {}
        }

        // The second character switches to the child asset on the last frame
        let entries: Vec<_> = crowd
            .iter()
            .enumerate()
            .map(|(i, props)| {
                let asset = if frame == 2 && i == 1 { &child } else { &adult };
                (props, asset)
            })
            .collect();

        let report = roster.sync(&mut scene, entries);
        scene.update();

        println!(
            "frame {frame}: spawned {:?}, rebuilt {:?}, updated {:?}, despawned {:?}, failed {}",
            report.spawned,
            report.rebuilt,
            report.updated,
            report.despawned,
            report.failed.len()
        );
    }

    for id in ["extra-0", "extra-1", "extra-2"] {
        let Some(instance) = roster.get(id) else {
            continue;
        };
        let group = scene.get_node(instance.group()).map(|n| n.transform.clone());
        let bounds = scene.world_bounds(instance.group());
        if let (Some(transform), Some(bounds)) = (group, bounds) {
            println!(
                "{id}: asset {}, position {:?}, height {:.2}",
                instance.asset().name,
                transform.position,
                bounds.height()
            );
        }
    }

    roster.clear(&mut scene);
    println!("nodes left after clear: {}", scene.nodes.len());
    Ok(())
}
