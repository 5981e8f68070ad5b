#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Independently posable skinned characters cloned from one shared asset.
//!
//! A loader produces a [`CharacterAsset`]. Each on-screen character gets its
//! own deep clone of it, rebound to its own skeleton, so posing or scaling
//! one character never leaks into another.
//!
//! ```rust,ignore
//! let mut scene = Scene::new();
//! let mut roster = CharacterRoster::new(CharacterSettings::default());
//!
//! let props = CharacterProps::from_json(json)?;
//! let report = roster.sync(&mut scene, [(&props, &asset)]);
//! scene.update();
//! ```

pub mod errors;
pub mod scene;
pub mod resources;
pub mod animation;
pub mod assets;
pub mod character;

pub use errors::{Result, TroupeError};
pub use scene::{CharacterUserData, Node, NodeFlags, NodeHandle, Scene, Skeleton, SkeletonKey, Transform};
pub use resources::{BoundingBox, Geometry, Material, Mesh, MeshToonMaterial, Texture};
pub use animation::AnimationClip;
pub use assets::{AssetNode, AssetSkeleton, CharacterAsset, SharedAsset};
pub use character::{
    AssetCloner, CharacterInstance, CharacterProps, CharacterRoster, CharacterSettings,
    ClonedAsset, EulerAngles, MorphWeights, Pose, SyncReport, WorldPosition, Yaw,
};
