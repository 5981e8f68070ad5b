//! Scene graph module
//!
//! Manages the node hierarchy and its components:
//! - Node: scene node (parent/child links, transform, flags)
//! - Transform: TRS component with dirty checking
//! - Scene: node arena plus component tables
//! - Skeleton: ordered bones and inverse bind matrices
//! - TransformSystem: world matrix propagation, decoupled from `Scene`
//! - SceneNode: chainable node operations

pub mod node;
pub mod transform;
pub mod transform_system;
pub mod scene;
pub mod skeleton;
pub mod wrapper;

pub use node::{Node, NodeFlags};
pub use transform::Transform;
pub use scene::{CharacterUserData, Scene};
pub use skeleton::{BindMode, SkinBinding, Skeleton};
pub use wrapper::SceneNode;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct SkeletonKey;
}
