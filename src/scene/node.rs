use crate::scene::NodeHandle;
use crate::scene::transform::Transform;
use bitflags::bitflags;
use glam::Affine3A;

bitflags! {
    /// Node role markers.
    ///
    /// Kept on the node itself because the cloner classifies every node of a
    /// cloned subtree in a single walk.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// The node is a bone that a skeleton may reference by name.
        const BONE         = 1 << 0;
        /// The node carries a mesh that is deformed by a skeleton.
        const SKINNED_MESH = 1 << 1;
    }
}

/// A minimal scene node containing only essential hot data.
///
/// # Design Principles
///
/// - Only keeps data that must be traversed every frame (hierarchy and transform)
/// - Other attributes (name, mesh, skin binding, user data) are stored in
///   Scene's component maps
///
/// # Hierarchy
///
/// Nodes form a tree structure through parent-child relationships:
/// - `parent`: Optional handle to parent node (None for root nodes)
/// - `children`: List of child node handles
#[derive(Debug, Clone)]
pub struct Node {
    // === Core Hierarchy ===
    /// Parent node handle (None for root nodes)
    pub(crate) parent: Option<NodeHandle>,
    /// Child node handles
    pub(crate) children: Vec<NodeHandle>,

    // === Core Spatial Data ===
    /// Transform component (hot data accessed every frame)
    pub transform: Transform,

    // === Core State ===
    /// Visibility flag
    pub visible: bool,
    /// Role markers (bone, skinned mesh)
    pub flags: NodeFlags,
}

impl Node {
    /// Creates a new node with default transform and visibility.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            flags: NodeFlags::empty(),
        }
    }

    /// Creates a new node that starts from the given transform.
    #[must_use]
    pub fn with_transform(transform: Transform) -> Self {
        let mut node = Self::new();
        node.transform = transform;
        node.transform.mark_dirty();
        node
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn is_bone(&self) -> bool {
        self.flags.contains(NodeFlags::BONE)
    }

    #[inline]
    #[must_use]
    pub fn is_skinned_mesh(&self) -> bool {
        self.flags.contains(NodeFlags::SKINNED_MESH)
    }

    /// Returns a reference to the world transformation matrix.
    ///
    /// Only valid after the transform system has propagated this node.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
