//! In-memory asset model.
//!
//! A loader turns a model file into a [`CharacterAsset`]; characters clone it
//! into the scene. Parsing itself lives outside this crate.

pub mod character_asset;

pub use character_asset::{AssetNode, AssetSkeleton, CharacterAsset, SharedAsset};
