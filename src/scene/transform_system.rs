//! Transform System
//!
//! Propagates world matrices through the node hierarchy. Decoupled from
//! [`Scene`](crate::scene::Scene) so it only borrows the node arena, which
//! keeps component tables free for concurrent borrows by the caller.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Updates world matrices for every tree below `roots`.
///
/// Uses an explicit stack instead of recursion so deep rigs cannot overflow
/// the call stack. A node's world matrix is only rebuilt when its local TRS
/// changed or an ancestor's world matrix changed.
pub fn update_hierarchy_iterative(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root_handle in roots.iter().rev() {
        stack.push((root_handle, Affine3A::IDENTITY, false));
    }

    propagate(nodes, &mut stack);
}

/// Updates the subtree rooted at `root_handle`, starting from its parent's
/// current world matrix. The root is always treated as changed.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, root_handle: NodeHandle) {
    let Some(node) = nodes.get(root_handle) else {
        return;
    };

    let parent_world = node
        .parent
        .and_then(|p| nodes.get(p))
        .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);

    let mut stack = vec![(root_handle, parent_world, true)];
    propagate(nodes, &mut stack);
}

/// Returns the transform of `node_handle` relative to `ancestor`, composed
/// from local TRS values only. Cached matrices are neither read nor written.
///
/// Returns `None` if `ancestor` is not on the node's parent chain.
#[must_use]
pub fn relative_matrix(
    nodes: &SlotMap<NodeHandle, Node>,
    node_handle: NodeHandle,
    ancestor: NodeHandle,
) -> Option<Affine3A> {
    let mut matrix = Affine3A::IDENTITY;
    let mut current = node_handle;

    while current != ancestor {
        let node = nodes.get(current)?;
        matrix = node.transform.compose() * matrix;
        current = node.parent?;
    }

    Some(matrix)
}

fn propagate(nodes: &mut SlotMap<NodeHandle, Node>, stack: &mut Vec<(NodeHandle, Affine3A, bool)>) {
    while let Some((node_handle, parent_world_matrix, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(node_handle) else {
            continue;
        };

        // 1. Local matrix
        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        // 2. World matrix
        if world_needs_update {
            let new_world = parent_world_matrix * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);
        }

        // 3. Children, pushed in reverse to keep declaration order
        let current_world = node.transform.world_matrix;
        for &child_handle in node.children.iter().rev() {
            stack.push((child_handle, current_world, world_needs_update));
        }
    }
}
