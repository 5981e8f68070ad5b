//! Deep-cloning of assets into a scene.
//!
//! Every node of the asset becomes a new scene node. Skinned meshes are then
//! rebound to fresh skeletons built from the *cloned* bones, looked up by
//! name, in the source skeleton's joint order. Inverse bind matrices and
//! animation clips are shared with the asset, never copied.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::animation::clip::AnimationClip;
use crate::assets::CharacterAsset;
use crate::errors::{Result, TroupeError};
use crate::scene::{Node, NodeFlags, NodeHandle, Scene, Skeleton, SkeletonKey};

/// Result of cloning an asset into a scene.
///
/// The caller owns everything listed here. Dropping a `ClonedAsset` does not
/// touch the scene; call [`ClonedAsset::discard`] to release an unused clone.
#[derive(Debug, Clone)]
pub struct ClonedAsset {
    /// Fresh root node named after the asset; the asset's roots hang below it
    pub root: NodeHandle,
    /// Every rebound skinned mesh with its new skeleton, in asset order
    pub skinned_meshes: Vec<(NodeHandle, SkeletonKey)>,
    /// Clips shared with the asset
    pub animations: Vec<Arc<AnimationClip>>,
    pub asset_id: Uuid,
    pub asset_name: String,
}

impl ClonedAsset {
    /// The skeleton bound to `mesh` by this clone.
    #[must_use]
    pub fn skeleton_for(&self, mesh: NodeHandle) -> Option<SkeletonKey> {
        self.skinned_meshes
            .iter()
            .find(|(handle, _)| *handle == mesh)
            .map(|&(_, key)| key)
    }

    /// Removes every node and skeleton the clone created.
    pub fn discard(self, scene: &mut Scene) {
        scene.remove_node(self.root);
        for (_, key) in self.skinned_meshes {
            scene.remove_skeleton(key);
        }
    }
}

/// Name tables of a cloned subtree, built in one walk. On duplicate names the
/// first node in depth-first order wins.
#[derive(Default)]
struct CloneTables {
    bones: FxHashMap<String, NodeHandle>,
    skinned_meshes: FxHashMap<String, NodeHandle>,
}

impl CloneTables {
    fn collect(scene: &Scene, root: NodeHandle) -> Self {
        let mut tables = Self::default();
        scene.traverse(root, |handle| {
            let (Some(node), Some(name)) = (scene.get_node(handle), scene.get_name(handle)) else {
                return;
            };
            if node.is_bone() {
                tables.bones.entry(name.to_string()).or_insert(handle);
            }
            if node.is_skinned_mesh() {
                tables.skinned_meshes.entry(name.to_string()).or_insert(handle);
            }
        });
        tables
    }
}

pub struct AssetCloner;

impl AssetCloner {
    /// Clones `asset` into `scene` under a new root node.
    ///
    /// Fails if a skeleton names a bone with no cloned counterpart, if a
    /// skeleton's bone and matrix counts differ, or if the asset holds an
    /// out-of-range index. On failure nothing created here remains in the
    /// scene.
    pub fn clone(asset: &CharacterAsset, scene: &mut Scene) -> Result<ClonedAsset> {
        let root = scene.create_node_with_name(&asset.name);
        let mut created = Vec::new();

        match Self::clone_into(asset, scene, root, &mut created) {
            Ok(()) => {
                log::debug!(
                    "Cloned asset '{}': {} skinned mesh(es) rebound",
                    asset.name,
                    created.len()
                );
                Ok(ClonedAsset {
                    root,
                    skinned_meshes: created,
                    animations: asset.animations.clone(),
                    asset_id: asset.id,
                    asset_name: asset.name.clone(),
                })
            }
            Err(err) => {
                scene.remove_node(root);
                for (_, key) in created {
                    scene.remove_skeleton(key);
                }
                Err(err)
            }
        }
    }

    fn clone_into(
        asset: &CharacterAsset,
        scene: &mut Scene,
        root: NodeHandle,
        created: &mut Vec<(NodeHandle, SkeletonKey)>,
    ) -> Result<()> {
        // 1. Hierarchy, plus the source skinned meshes keyed by name
        let mut order = Vec::with_capacity(asset.nodes.len());
        asset.walk(|index, parent| order.push((index, parent)))?;

        let mut mapping: Vec<Option<NodeHandle>> = vec![None; asset.nodes.len()];
        let mut source_meshes: Vec<(&str, usize)> = Vec::new();

        for (index, parent) in order {
            let source = &asset.nodes[index];

            let mut node = Node::with_transform(source.transform.clone());
            node.flags.set(NodeFlags::BONE, source.is_bone);
            node.flags.set(NodeFlags::SKINNED_MESH, source.is_skinned_mesh());

            let parent_handle = parent.and_then(|p| mapping[p]).unwrap_or(root);
            let handle = scene.add_to_parent(node, parent_handle);
            scene.set_name(handle, &source.name);
            if let Some(mesh) = &source.mesh {
                scene.set_mesh(handle, mesh.clone());
            }
            mapping[index] = Some(handle);

            if source.is_skinned_mesh()
                && let Some(skin) = source.skin_index
            {
                if skin >= asset.skeletons.len() {
                    return Err(TroupeError::AssetIndexOutOfBounds {
                        context: format!("skeleton of skinned mesh '{}'", source.name),
                        index: skin,
                    });
                }
                if !source_meshes.iter().any(|(name, _)| *name == source.name) {
                    source_meshes.push((&source.name, skin));
                }
            }
        }

        if source_meshes.is_empty() {
            return Ok(());
        }

        // 2. Name tables over the clone
        let tables = CloneTables::collect(scene, root);

        // Bind matrices come from world matrices
        scene.update_subtree(root);

        // 3. Rebind
        for (mesh_name, skin) in source_meshes {
            let source_skeleton = &asset.skeletons[skin];

            let bones = source_skeleton
                .bone_names
                .iter()
                .map(|bone| {
                    tables
                        .bones
                        .get(bone)
                        .map(|&handle| (bone.clone(), handle))
                        .ok_or_else(|| TroupeError::SkeletonBind {
                            mesh: mesh_name.to_string(),
                            bone: bone.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            let skeleton = Skeleton::new(
                &source_skeleton.name,
                bones,
                Arc::clone(&source_skeleton.inverse_bind_matrices),
                source_skeleton.root_bone_index,
            )?;

            let Some(&mesh_handle) = tables.skinned_meshes.get(mesh_name) else {
                continue;
            };
            let key = scene.add_skeleton(skeleton);
            created.push((mesh_handle, key));
            scene.bind_skin(mesh_handle, key);

            log::debug!("Bound '{mesh_name}' to cloned skeleton '{}'", source_skeleton.name);
        }

        Ok(())
    }
}
