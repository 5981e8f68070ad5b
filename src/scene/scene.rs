use std::sync::atomic::{AtomicU32, Ordering};

use slotmap::{SecondaryMap, SlotMap, SparseSecondaryMap};

use crate::resources::geometry::BoundingBox;
use crate::resources::mesh::Mesh;
use crate::scene::node::Node;
use crate::scene::skeleton::{BindMode, Skeleton, SkinBinding};
use crate::scene::transform_system;
use crate::scene::wrapper::SceneNode;
use crate::scene::{MeshKey, NodeHandle, SkeletonKey};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Inspectable metadata stored on a character's group node.
///
/// `skeleton` is informational only: it does not keep the skeleton alive and
/// turns stale once the owning character is rebuilt or despawned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterUserData {
    pub id: String,
    pub character_type: String,
    pub model_settings: serde_json::Map<String, serde_json::Value>,
    pub skeleton: Option<SkeletonKey>,
}

/// Scene graph
///
/// The scene is a pure data layer: a node arena plus component tables keyed
/// by [`NodeHandle`]. Nodes only hold hierarchy and transform; names, meshes,
/// skin bindings and user data live in side tables so that a subtree can be
/// classified and rebound without touching unrelated data.
pub struct Scene {
    pub id: u32,

    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Component pools ====
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub skins: SlotMap<SkeletonKey, Skeleton>,

    // ==== Component tables ====
    names: SecondaryMap<NodeHandle, String>,
    mesh_components: SparseSecondaryMap<NodeHandle, MeshKey>,
    skin_components: SparseSecondaryMap<NodeHandle, SkinBinding>,
    user_data: SparseSecondaryMap<NodeHandle, CharacterUserData>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),

            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),

            meshes: SlotMap::with_key(),
            skins: SlotMap::with_key(),

            names: SecondaryMap::new(),
            mesh_components: SparseSecondaryMap::new(),
            skin_components: SparseSecondaryMap::new(),
            user_data: SparseSecondaryMap::new(),
        }
    }

    // ========================================================================
    // Node Creation & Hierarchy
    // ========================================================================

    /// Creates an empty root node.
    pub fn create_node(&mut self) -> NodeHandle {
        self.add_node(Node::new())
    }

    /// Creates an empty named root node.
    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.create_node();
        self.set_name(handle, name);
        handle
    }

    /// Adds a node to the scene as a root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Adds a node directly under `parent`.
    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        if !self.nodes.contains_key(parent) {
            log::error!("Parent node not found, adding child as root");
            return self.add_node(child);
        }

        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        }
        handle
    }

    /// Moves `child` under `parent`, detaching it from its previous parent
    /// (or from the root list). The child's local transform is kept.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if self.is_descendant_of(parent, child) {
            log::warn!("Cannot attach node to one of its own descendants!");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::error!("Node not found during attach!");
            return;
        }

        self.detach_from_parent(child);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    fn detach_from_parent(&mut self, child: NodeHandle) {
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }
    }

    /// Removes a node and its whole subtree, together with every component
    /// attached to those nodes. Skeletons are not removed: they are pooled
    /// separately and released by their owner.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }

        self.detach_from_parent(handle);

        let mut subtree = Vec::new();
        self.traverse(handle, |h| subtree.push(h));

        for h in subtree {
            if let Some(mesh_key) = self.mesh_components.remove(h) {
                self.meshes.remove(mesh_key);
            }
            self.skin_components.remove(h);
            self.user_data.remove(h);
            self.names.remove(h);
            self.nodes.remove(h);
        }
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Chainable operations on a node. Stale handles make every call a no-op.
    pub fn node(&mut self, handle: &NodeHandle) -> SceneNode<'_> {
        SceneNode::new(self, *handle)
    }

    /// Visits `root` and all of its descendants in depth-first pre-order.
    pub fn traverse(&self, root: NodeHandle, mut visitor: impl FnMut(NodeHandle)) {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            visitor(handle);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Whether `ancestor` lies on the parent chain of `handle`.
    #[must_use]
    pub fn is_descendant_of(&self, handle: NodeHandle, ancestor: NodeHandle) -> bool {
        let mut current = self.nodes.get(handle).and_then(Node::parent);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(Node::parent);
        }
        false
    }

    // ========================================================================
    // Names
    // ========================================================================

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if self.nodes.contains_key(handle) {
            self.names.insert(handle, name.to_string());
        }
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.names.get(handle).map(String::as_str)
    }

    // ========================================================================
    // Mesh Components
    // ========================================================================

    /// Attaches a mesh to a node, replacing (and dropping) any previous one.
    pub fn set_mesh(&mut self, handle: NodeHandle, mesh: Mesh) -> Option<MeshKey> {
        if !self.nodes.contains_key(handle) {
            return None;
        }
        let key = self.meshes.insert(mesh);
        if let Some(old) = self.mesh_components.insert(handle, key) {
            self.meshes.remove(old);
        }
        Some(key)
    }

    #[must_use]
    pub fn get_mesh(&self, handle: NodeHandle) -> Option<&Mesh> {
        let key = self.mesh_components.get(handle)?;
        self.meshes.get(*key)
    }

    pub fn get_mesh_mut(&mut self, handle: NodeHandle) -> Option<&mut Mesh> {
        let key = self.mesh_components.get(handle)?;
        self.meshes.get_mut(*key)
    }

    // ========================================================================
    // Skeletons & Skin Bindings
    // ========================================================================

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skins.insert(skeleton)
    }

    #[must_use]
    pub fn get_skeleton(&self, key: SkeletonKey) -> Option<&Skeleton> {
        self.skins.get(key)
    }

    pub fn get_skeleton_mut(&mut self, key: SkeletonKey) -> Option<&mut Skeleton> {
        self.skins.get_mut(key)
    }

    pub fn remove_skeleton(&mut self, key: SkeletonKey) -> Option<Skeleton> {
        self.skins.remove(key)
    }

    /// Binds a mesh node to a skeleton, using the node's current world matrix
    /// as the bind matrix. Call after the node's world matrix is up to date.
    pub fn bind_skin(&mut self, handle: NodeHandle, skeleton: SkeletonKey) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };
        if !self.skins.contains_key(skeleton) {
            return false;
        }
        let binding = SkinBinding::new(skeleton, node.transform.world_matrix);
        self.skin_components.insert(handle, binding);
        true
    }

    #[must_use]
    pub fn get_skin(&self, handle: NodeHandle) -> Option<&SkinBinding> {
        self.skin_components.get(handle)
    }

    /// Skeleton bound to a skinned mesh node, if any.
    #[must_use]
    pub fn skeleton_of(&self, handle: NodeHandle) -> Option<&Skeleton> {
        let binding = self.skin_components.get(handle)?;
        self.skins.get(binding.skeleton)
    }

    // ========================================================================
    // User Data
    // ========================================================================

    pub fn set_user_data(&mut self, handle: NodeHandle, data: CharacterUserData) {
        if self.nodes.contains_key(handle) {
            self.user_data.insert(handle, data);
        }
    }

    #[must_use]
    pub fn get_user_data(&self, handle: NodeHandle) -> Option<&CharacterUserData> {
        self.user_data.get(handle)
    }

    pub fn get_user_data_mut(&mut self, handle: NodeHandle) -> Option<&mut CharacterUserData> {
        self.user_data.get_mut(handle)
    }

    // ========================================================================
    // Matrix Update Pipeline
    // ========================================================================

    /// Updates world matrices for the whole scene.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &self.root_nodes);
    }

    /// Updates world matrices for one subtree.
    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, root);
    }

    /// Recomputes joint matrices for every bound skeleton.
    pub fn update_skeletons(&mut self) {
        // Step 1: collect tasks (skeleton, inverse root matrix)
        let tasks: Vec<_> = self
            .skin_components
            .iter()
            .filter_map(|(handle, binding)| {
                let node = self.nodes.get(handle)?;
                let root_inv = match binding.bind_mode {
                    BindMode::Attached => node.transform.world_matrix.inverse(),
                    BindMode::Detached => binding.bind_matrix_inv,
                };
                Some((binding.skeleton, root_inv))
            })
            .collect();

        // Step 2: run them with read-only nodes and mutable skeletons
        let nodes = &self.nodes;
        for (key, root_inv) in tasks {
            if let Some(skeleton) = self.skins.get_mut(key) {
                skeleton.compute_joint_matrices(nodes, root_inv);
            }
        }
    }

    /// Per-frame update: transforms first, then skinning matrices.
    pub fn update(&mut self) {
        self.update_matrix_world();
        self.update_skeletons();
    }

    // ========================================================================
    // Bounds
    // ========================================================================

    /// World-space bounds of every mesh in the subtree, from each geometry's
    /// bounding box and the node's cached world matrix.
    #[must_use]
    pub fn world_bounds(&self, root: NodeHandle) -> Option<BoundingBox> {
        let mut combined: Option<BoundingBox> = None;
        self.traverse(root, |handle| {
            let Some(local) = self.get_mesh(handle).and_then(|m| m.geometry.bounding_box())
            else {
                return;
            };
            let Some(node) = self.nodes.get(handle) else {
                return;
            };
            let bbox = local.transform(&node.transform.world_matrix);
            combined = Some(combined.map_or(bbox, |c| c.union(&bbox)));
        });
        combined
    }

    /// Bounds of every mesh in the subtree expressed in `root`'s own frame,
    /// i.e. ignoring `root`'s transform and everything above it. Computed from
    /// local TRS values, so no matrix update is required beforehand.
    #[must_use]
    pub fn local_bounds(&self, root: NodeHandle) -> Option<BoundingBox> {
        let mut combined: Option<BoundingBox> = None;
        self.traverse(root, |handle| {
            let Some(local) = self.get_mesh(handle).and_then(|m| m.geometry.bounding_box())
            else {
                return;
            };
            let Some(relative) = transform_system::relative_matrix(&self.nodes, handle, root)
            else {
                return;
            };
            let bbox = local.transform(&relative);
            combined = Some(combined.map_or(bbox, |c| c.union(&bbox)));
        });
        combined
    }
}
