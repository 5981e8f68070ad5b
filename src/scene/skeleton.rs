use std::sync::Arc;

use glam::{Affine3A, Mat4};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use uuid::Uuid;

use crate::errors::{Result, TroupeError};
use crate::scene::{Node, NodeHandle, SkeletonKey};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindMode {
    /// Bones follow node movement (most common, e.g., character skinning)
    /// In this case, the mesh's current world matrix is inverted every update
    Attached,
    /// Bones are detached from nodes (special use cases)
    /// In this case, uses the static `bind_matrix_inv` recorded at bind time
    Detached,
}

/// Skin component attached to a skinned mesh node.
#[derive(Debug, Clone)]
pub struct SkinBinding {
    pub skeleton: SkeletonKey,
    pub bind_mode: BindMode,
    /// Mesh world matrix snapshot at bind time
    pub bind_matrix: Affine3A,
    /// Inverse of `bind_matrix`
    pub bind_matrix_inv: Affine3A,
}

impl SkinBinding {
    #[must_use]
    pub fn new(skeleton: SkeletonKey, bind_matrix: Affine3A) -> Self {
        Self {
            skeleton,
            bind_mode: BindMode::Attached,
            bind_matrix,
            bind_matrix_inv: bind_matrix.inverse(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    // === Core Data ===
    // Bone list: ordered array, corresponds to joint index in the vertex data
    pub bones: Vec<NodeHandle>,

    // Inverse Bind Matrices, index-aligned with `bones`.
    // Read-only asset data: every skeleton cloned from the same source shares
    // one allocation.
    pub(crate) inverse_bind_matrices: Arc<[Affine3A]>,

    // Bone name -> index into `bones`
    bone_lookup: FxHashMap<String, usize>,

    /// Root bone index (usually bones[0])
    pub(crate) root_bone_index: usize,

    // === Runtime Data ===
    // Final skinning matrices, recomputed by `compute_joint_matrices`
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// Builds a skeleton from named bones in joint order.
    ///
    /// Fails when the bone list and the inverse bind matrices differ in
    /// length. When two bones share a name, lookups resolve to the first.
    pub fn new(
        name: &str,
        bones: Vec<(String, NodeHandle)>,
        inverse_bind_matrices: Arc<[Affine3A]>,
        root_bone_index: usize,
    ) -> Result<Self> {
        if bones.len() != inverse_bind_matrices.len() {
            return Err(TroupeError::SkeletonLayout {
                skeleton: name.to_string(),
                bones: bones.len(),
                inverse_bind_matrices: inverse_bind_matrices.len(),
            });
        }

        let count = bones.len();
        let mut bone_lookup = FxHashMap::default();
        let mut handles = Vec::with_capacity(count);

        for (i, (bone_name, handle)) in bones.into_iter().enumerate() {
            bone_lookup.entry(bone_name).or_insert(i);
            handles.push(handle);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bones: handles,
            inverse_bind_matrices,
            bone_lookup,
            root_bone_index,
            joint_matrices: vec![Mat4::IDENTITY; count],
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Gets the root bone node handle
    #[inline]
    #[must_use]
    pub fn root_bone(&self) -> Option<NodeHandle> {
        self.bones.get(self.root_bone_index).copied()
    }

    /// Looks up a bone by name.
    #[inline]
    #[must_use]
    pub fn bone_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.bone_lookup.get(name).map(|&i| self.bones[i])
    }

    /// Index of the named bone in joint order.
    #[inline]
    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone_lookup.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_matrices(&self) -> &[Affine3A] {
        &self.inverse_bind_matrices
    }

    /// Whether both skeletons share the same inverse bind matrix storage.
    #[inline]
    #[must_use]
    pub fn shares_bind_matrices_with(&self, other: &Skeleton) -> bool {
        Arc::ptr_eq(&self.inverse_bind_matrices, &other.inverse_bind_matrices)
    }

    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Makes the bones' current world pose the rest pose relative to
    /// `mesh_world`. The recomputed matrices get their own storage; bones
    /// missing from `nodes` keep their previous matrix.
    ///
    /// World matrices must be up to date.
    pub fn calculate_inverses(&mut self, nodes: &SlotMap<NodeHandle, Node>, mesh_world: Affine3A) {
        let inverses: Vec<Affine3A> = self
            .bones
            .iter()
            .zip(self.inverse_bind_matrices.iter())
            .map(|(&bone, &previous)| {
                nodes
                    .get(bone)
                    .map_or(previous, |n| n.transform.world_matrix.inverse() * mesh_world)
            })
            .collect();
        self.inverse_bind_matrices = Arc::from(inverses);
    }

    /// Updates bone matrices
    ///
    /// # Arguments
    /// * `nodes`: Global node storage, from which we read each bone's `world_matrix`
    /// * `root_matrix_inv`: Inverse of the world matrix of the node containing the skinned mesh
    ///   (used to transform bone transforms back to mesh local space)
    pub fn compute_joint_matrices(
        &mut self,
        nodes: &SlotMap<NodeHandle, Node>,
        root_matrix_inv: Affine3A,
    ) {
        for (i, &bone_handle) in self.bones.iter().enumerate() {
            let Some(bone_node) = nodes.get(bone_handle) else {
                continue;
            };
            let bone_world_matrix = bone_node.transform.world_matrix;
            let ibm = self.inverse_bind_matrices[i];

            // IBM first (mesh space -> bone local), then the bone's current
            // world transform, then back into mesh space.
            self.joint_matrices[i] = (root_matrix_inv * bone_world_matrix * ibm).into();
        }
    }
}
