//! Characters: cloned, posed and scaled instances of a shared asset.
//!
//! - [`AssetCloner`]: deep-clones an asset and rebinds its skinned meshes
//! - [`CharacterInstance`]: one character's mesh, skeleton and group node
//! - [`CharacterRoster`]: spawns, updates and despawns instances
//! - [`CharacterProps`], [`Pose`], [`CharacterSettings`]: inputs and config

pub mod cloner;
pub mod instance;
pub mod pose;
pub mod props;
pub mod roster;
pub mod settings;

pub use cloner::{AssetCloner, ClonedAsset};
pub use instance::CharacterInstance;
pub use pose::{BonePose, EulerAngles, Pose};
pub use props::{CharacterProps, MorphWeights, WorldPosition, Yaw};
pub use roster::{CharacterRoster, SyncReport};
pub use settings::{CharacterSettings, RotationOrder, ToonStyle};
