use std::sync::Arc;

use crate::animation::clip::AnimationClip;
use crate::assets::SharedAsset;
use crate::character::cloner::{AssetCloner, ClonedAsset};
use crate::character::pose::Pose;
use crate::character::props::{CharacterProps, MorphWeights, WorldPosition, Yaw};
use crate::character::settings::{CharacterSettings, RotationOrder};
use crate::errors::{Result, TroupeError};
use crate::resources::material::Material;
use crate::scene::{CharacterUserData, NodeHandle, Scene, SkeletonKey};

/// The mesh and skeleton kept from one clone.
struct Rig {
    mesh: NodeHandle,
    skeleton: SkeletonKey,
    animations: Vec<Arc<AnimationClip>>,
}

/// One on-screen character.
///
/// Owns its group node, the single skinned mesh below it (with the bones
/// re-parented under the mesh) and that mesh's skeleton. Nothing else in the
/// scene references them except the informational skeleton key in the
/// group's user data.
#[derive(Debug)]
pub struct CharacterInstance {
    id: String,
    character_type: String,
    asset: SharedAsset,

    group: NodeHandle,
    mesh: NodeHandle,
    skeleton: SkeletonKey,
    animations: Vec<Arc<AnimationClip>>,

    settings: CharacterSettings,
    morph_weights: MorphWeights,
    pose: Pose,
    target_height: Option<f32>,
}

impl CharacterInstance {
    /// Clones `asset` into `scene` and sets it up from `props`.
    ///
    /// On error nothing is left in the scene.
    pub fn spawn(
        scene: &mut Scene,
        asset: SharedAsset,
        props: &CharacterProps,
        settings: &CharacterSettings,
    ) -> Result<Self> {
        let group = scene.create_node_with_name(&props.character_id);

        let rig = match build_rig(scene, group, &asset, settings, props.morph_weights, &props.pose) {
            Ok(rig) => rig,
            Err(err) => {
                scene.remove_node(group);
                return Err(err);
            }
        };

        scene.set_user_data(
            group,
            CharacterUserData {
                id: props.character_id.clone(),
                character_type: props.character_type.clone(),
                model_settings: props.model_settings.clone(),
                skeleton: Some(rig.skeleton),
            },
        );

        let mut instance = Self {
            id: props.character_id.clone(),
            character_type: props.character_type.clone(),
            asset,
            group,
            mesh: rig.mesh,
            skeleton: rig.skeleton,
            animations: rig.animations,
            settings: settings.clone(),
            morph_weights: props.morph_weights,
            pose: props.pose.clone(),
            target_height: None,
        };

        instance.set_position(scene, props.position);
        instance.set_facing(scene, props.facing_rotation);
        if let Some(height) = props.height {
            instance.set_height(scene, height);
        }
        scene.update_subtree(group);

        log::debug!("Spawned character '{}' from asset '{}'", instance.id, instance.asset.name);
        Ok(instance)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn character_type(&self) -> &str {
        &self.character_type
    }

    #[must_use]
    pub fn asset(&self) -> &SharedAsset {
        &self.asset
    }

    /// Whether `asset` is the very handle this character was built from.
    /// Handles are compared, not ids: an edited copy of an asset is a
    /// different asset.
    #[must_use]
    pub fn uses_asset(&self, asset: &SharedAsset) -> bool {
        Arc::ptr_eq(&self.asset, asset)
    }

    /// The group node positioned, rotated and scaled by this instance.
    #[must_use]
    pub fn group(&self) -> NodeHandle {
        self.group
    }

    /// The rendered skinned mesh, the group's only child.
    #[must_use]
    pub fn mesh(&self) -> NodeHandle {
        self.mesh
    }

    #[must_use]
    pub fn skeleton(&self) -> SkeletonKey {
        self.skeleton
    }

    #[must_use]
    pub fn animations(&self) -> &[Arc<AnimationClip>] {
        &self.animations
    }

    #[must_use]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    #[must_use]
    pub fn target_height(&self) -> Option<f32> {
        self.target_height
    }

    // ========================================================================
    // Synchronization
    // ========================================================================

    /// Rotates every bone named in `pose`. Unknown names are skipped, an
    /// empty pose changes nothing. Returns the number of bones written.
    pub fn set_pose(&mut self, scene: &mut Scene, pose: &Pose) -> usize {
        self.pose = pose.clone();
        if pose.is_empty() {
            return 0;
        }
        pose.apply(scene, self.skeleton, self.rotation_order())
    }

    pub fn set_position(&self, scene: &mut Scene, position: WorldPosition) {
        scene.node(&self.group).set_position_vec(position.to_render());
    }

    pub fn set_facing(&self, scene: &mut Scene, yaw: Yaw) {
        let rotation = self.rotation_order().quat(0.0, yaw.angle(), 0.0);
        scene.node(&self.group).set_rotation(rotation);
    }

    /// Scales the group uniformly so its rendered height becomes `target`.
    ///
    /// The height is measured in the group's own frame, so the result does
    /// not depend on the scale applied before. Returns the applied factor,
    /// or `None` when the bounds are empty or flat.
    pub fn set_height(&mut self, scene: &mut Scene, target: f32) -> Option<f32> {
        self.target_height = Some(target);

        let Some(bounds) = scene.local_bounds(self.group) else {
            log::warn!("Character '{}' has no bounds, height left unchanged", self.id);
            return None;
        };

        let height = bounds.height();
        if height <= 0.0 || !height.is_finite() {
            log::warn!(
                "Character '{}' has degenerate height {height}, scale left unchanged",
                self.id
            );
            return None;
        }

        let scale = target / height;
        scene.node(&self.group).set_scale(scale);
        Some(scale)
    }

    pub fn set_morph_weights(&mut self, scene: &mut Scene, weights: MorphWeights) {
        self.morph_weights = weights;
        if let Some(mesh) = scene.get_mesh_mut(self.mesh) {
            mesh.set_morph_target_influences(&weights.slots());
        }
    }

    /// Rebuilds the rig from `asset` unless it is the asset already in use.
    ///
    /// The new rig is fully set up before the old one is released, so on
    /// error the character keeps rendering the previous asset. Returns
    /// whether a rebuild happened.
    pub fn set_asset(&mut self, scene: &mut Scene, asset: SharedAsset) -> Result<bool> {
        if self.uses_asset(&asset) {
            return Ok(false);
        }

        let rig = build_rig(
            scene,
            self.group,
            &asset,
            &self.settings,
            self.morph_weights,
            &self.pose,
        )?;

        scene.remove_node(self.mesh);
        scene.remove_skeleton(self.skeleton);

        self.mesh = rig.mesh;
        self.skeleton = rig.skeleton;
        self.animations = rig.animations;
        self.asset = asset;

        if let Some(data) = scene.get_user_data_mut(self.group) {
            data.skeleton = Some(self.skeleton);
        }
        if let Some(height) = self.target_height {
            self.set_height(scene, height);
        }
        scene.update_subtree(self.group);

        log::debug!("Rebuilt character '{}' from asset '{}'", self.id, self.asset.name);
        Ok(true)
    }

    /// Releases the group, the mesh, the bones and the skeleton.
    pub fn despawn(self, scene: &mut Scene) {
        scene.remove_node(self.group);
        scene.remove_skeleton(self.skeleton);
        log::debug!("Despawned character '{}'", self.id);
    }

    #[inline]
    fn rotation_order(&self) -> RotationOrder {
        self.settings.rotation_order
    }
}

// ============================================================================
// Rig setup
// ============================================================================

/// Clones `asset`, prepares its primary skinned mesh and moves the mesh under
/// `group`. Everything else from the clone is released.
fn build_rig(
    scene: &mut Scene,
    group: NodeHandle,
    asset: &SharedAsset,
    settings: &CharacterSettings,
    morph_weights: MorphWeights,
    pose: &Pose,
) -> Result<Rig> {
    let cloned = AssetCloner::clone(asset, scene)?;

    let (mesh, skeleton) = match prepare_mesh(scene, &cloned, settings, morph_weights, pose) {
        Ok(found) => found,
        Err(err) => {
            cloned.discard(scene);
            return Err(err);
        }
    };

    scene.attach(mesh, group);

    for &(_, key) in &cloned.skinned_meshes {
        if key != skeleton {
            scene.remove_skeleton(key);
        }
    }
    scene.remove_node(cloned.root);

    Ok(Rig {
        mesh,
        skeleton,
        animations: cloned.animations,
    })
}

/// First bound skinned mesh among the clone root's children, else among the
/// children of its first child.
fn find_primary_mesh(scene: &Scene, root: NodeHandle) -> Option<NodeHandle> {
    let is_candidate = |handle: &&NodeHandle| {
        scene.get_node(**handle).is_some_and(|n| n.is_skinned_mesh())
            && scene.get_skin(**handle).is_some()
    };

    let children = scene.get_node(root)?.children();
    children
        .iter()
        .find(is_candidate)
        .or_else(|| {
            let first = scene.get_node(*children.first()?)?;
            first.children().iter().find(is_candidate)
        })
        .copied()
}

fn prepare_mesh(
    scene: &mut Scene,
    cloned: &ClonedAsset,
    settings: &CharacterSettings,
    morph_weights: MorphWeights,
    pose: &Pose,
) -> Result<(NodeHandle, SkeletonKey)> {
    let missing = || TroupeError::MissingMesh {
        asset: cloned.asset_name.clone(),
    };

    let mesh_handle = find_primary_mesh(scene, cloned.root).ok_or_else(missing)?;
    let skeleton = scene
        .get_skin(mesh_handle)
        .map(|binding| binding.skeleton)
        .ok_or_else(missing)?;

    // 1. Material and morph weights
    let mesh = scene.get_mesh_mut(mesh_handle).ok_or_else(missing)?;
    let color_map = mesh.material.data.map().texture.clone();
    let mut material = settings.toon.build_material();
    if color_map.is_some() {
        material.set_map(color_map);
    }
    mesh.material = Material::from(material);
    mesh.set_morph_target_influences(&morph_weights.slots());

    // 2. Bones travel with the mesh
    reparent_bones(scene, mesh_handle, skeleton);

    // 3. Bind
    scene.update_subtree(cloned.root);
    if settings.rebind_from_rest_pose {
        let mesh_world = scene
            .get_node(mesh_handle)
            .map(|n| *n.world_matrix())
            .unwrap_or_default();
        if let Some(skel) = scene.skins.get_mut(skeleton) {
            skel.calculate_inverses(&scene.nodes, mesh_world);
        }
    }
    scene.bind_skin(mesh_handle, skeleton);

    // 4. Initial pose
    pose.apply(scene, skeleton, settings.rotation_order);

    Ok((mesh_handle, skeleton))
}

/// Moves the root bone under the mesh, then any bone chain the root bone
/// does not contain, so removing the rest of the clone keeps every bone.
fn reparent_bones(scene: &mut Scene, mesh: NodeHandle, skeleton: SkeletonKey) {
    let Some(skel) = scene.get_skeleton(skeleton) else {
        return;
    };
    let root_bone = skel.root_bone();
    let bones = skel.bones.clone();

    for bone in root_bone.into_iter().chain(bones) {
        if bone == mesh || scene.is_descendant_of(bone, mesh) {
            continue;
        }
        let top = topmost_bone(scene, bone);
        scene.attach(top, mesh);
    }
}

fn topmost_bone(scene: &Scene, bone: NodeHandle) -> NodeHandle {
    let mut top = bone;
    while let Some(parent) = scene.get_node(top).and_then(|n| n.parent())
        && scene.get_node(parent).is_some_and(|n| n.is_bone())
    {
        top = parent;
    }
    top
}
