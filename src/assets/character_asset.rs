use std::sync::Arc;

use glam::Affine3A;
use uuid::Uuid;

use crate::animation::clip::AnimationClip;
use crate::errors::{Result, TroupeError};
use crate::resources::mesh::Mesh;
use crate::scene::transform::Transform;

/// Asset node: plain data, children referenced by index.
#[derive(Debug, Clone)]
pub struct AssetNode {
    pub name: String,
    pub transform: Transform,
    /// Indices of child nodes in `CharacterAsset::nodes`
    pub children_indices: Vec<usize>,
    /// Whether skeletons may reference this node as a bone
    pub is_bone: bool,
    /// Mesh component (if any)
    pub mesh: Option<Mesh>,
    /// Index of the skeleton in `CharacterAsset::skeletons` deforming `mesh`
    pub skin_index: Option<usize>,
}

impl AssetNode {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::new(),
            children_indices: Vec::new(),
            is_bone: false,
            mesh: None,
            skin_index: None,
        }
    }

    #[must_use]
    pub fn bone(name: &str, transform: Transform) -> Self {
        Self {
            transform,
            is_bone: true,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn skinned_mesh(name: &str, mesh: Mesh, skin_index: usize) -> Self {
        Self {
            mesh: Some(mesh),
            skin_index: Some(skin_index),
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// A mesh node deformed by a skeleton.
    #[inline]
    #[must_use]
    pub fn is_skinned_mesh(&self) -> bool {
        self.mesh.is_some() && self.skin_index.is_some()
    }
}

/// Skeleton as authored in the asset: bones by name, in joint order.
#[derive(Debug, Clone)]
pub struct AssetSkeleton {
    pub name: String,
    /// Index of the root bone in `bone_names`
    pub root_bone_index: usize,
    pub bone_names: Vec<String>,
    /// Index-aligned with `bone_names`, shared with every clone
    pub inverse_bind_matrices: Arc<[Affine3A]>,
}

impl AssetSkeleton {
    #[must_use]
    pub fn new(name: &str, bone_names: Vec<String>, inverse_bind_matrices: Vec<Affine3A>) -> Self {
        Self {
            name: name.to_string(),
            root_bone_index: 0,
            bone_names,
            inverse_bind_matrices: Arc::from(inverse_bind_matrices),
        }
    }
}

/// A loaded character asset: the in-memory result of parsing a model file.
///
/// `CharacterAsset` is immutable once shared. Instances never reference its
/// nodes; [`AssetCloner`](crate::character::AssetCloner) copies them into a
/// scene. "Asset changed" compares [`SharedAsset`] handles, never contents;
/// the `id` names the asset in logs and clone results.
#[derive(Debug, Clone)]
pub struct CharacterAsset {
    pub id: Uuid,
    pub name: String,
    /// Flat node storage
    pub nodes: Vec<AssetNode>,
    /// Indices of top-level nodes
    pub root_indices: Vec<usize>,
    pub skeletons: Vec<AssetSkeleton>,
    pub animations: Vec<Arc<AnimationClip>>,
}

/// Shared, read-only asset reference.
pub type SharedAsset = Arc<CharacterAsset>;

impl CharacterAsset {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            nodes: Vec::new(),
            root_indices: Vec::new(),
            skeletons: Vec::new(),
            animations: Vec::new(),
        }
    }

    #[must_use]
    pub fn into_shared(self) -> SharedAsset {
        Arc::new(self)
    }

    /// Adds a top-level node and returns its index.
    pub fn add_root(&mut self, node: AssetNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        self.root_indices.push(index);
        index
    }

    /// Adds `node` as the last child of `parent` and returns its index.
    pub fn add_child(&mut self, parent: usize, node: AssetNode) -> Result<usize> {
        if parent >= self.nodes.len() {
            return Err(TroupeError::AssetIndexOutOfBounds {
                context: format!("parent node of '{}'", node.name),
                index: parent,
            });
        }
        let index = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children_indices.push(index);
        Ok(index)
    }

    pub fn add_skeleton(&mut self, skeleton: AssetSkeleton) -> usize {
        self.skeletons.push(skeleton);
        self.skeletons.len() - 1
    }

    /// Adds a skeleton whose inverse bind matrices are the inverted rest-pose
    /// world matrices of the named bones. Loaders use this when the source
    /// file omits bind matrices.
    pub fn add_skeleton_from_rest_pose(&mut self, name: &str, bone_names: &[&str]) -> Result<usize> {
        let world = self.rest_world_matrices()?;
        let mut inverse_bind_matrices = Vec::with_capacity(bone_names.len());

        for &bone in bone_names {
            let index = self
                .nodes
                .iter()
                .position(|n| n.is_bone && n.name == bone)
                .ok_or_else(|| TroupeError::SkeletonBind {
                    mesh: name.to_string(),
                    bone: bone.to_string(),
                })?;
            inverse_bind_matrices.push(world[index].inverse());
        }

        let bone_names = bone_names.iter().map(|s| (*s).to_string()).collect();
        Ok(self.add_skeleton(AssetSkeleton::new(name, bone_names, inverse_bind_matrices)))
    }

    pub fn add_animation(&mut self, clip: AnimationClip) {
        self.animations.push(Arc::new(clip));
    }

    #[must_use]
    pub fn node(&self, index: usize) -> Option<&AssetNode> {
        self.nodes.get(index)
    }

    /// Visits every node reachable from the roots in depth-first pre-order,
    /// passing `(index, parent index)`. A node referenced more than once is
    /// visited only the first time.
    pub fn walk(&self, mut visitor: impl FnMut(usize, Option<usize>)) -> Result<()> {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, Option<usize>)> =
            self.root_indices.iter().rev().map(|&i| (i, None)).collect();

        while let Some((index, parent)) = stack.pop() {
            let node = self.nodes.get(index).ok_or_else(|| TroupeError::AssetIndexOutOfBounds {
                context: format!("node of asset '{}'", self.name),
                index,
            })?;
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            visitor(index, parent);
            stack.extend(node.children_indices.iter().rev().map(|&c| (c, Some(index))));
        }

        Ok(())
    }

    /// Rest-pose world matrices, indexed like `nodes`. Unreachable nodes get
    /// the identity.
    pub fn rest_world_matrices(&self) -> Result<Vec<Affine3A>> {
        let mut world = vec![Affine3A::IDENTITY; self.nodes.len()];
        self.walk(|index, parent| {
            let local = self.nodes[index].transform.compose();
            world[index] = parent.map_or(local, |p| world[p] * local);
        })?;
        Ok(world)
    }
}
