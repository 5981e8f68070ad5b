//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`TroupeError`] covers the data-shape failures that can
//! occur while cloning an asset or setting up a character:
//! - A skinned mesh whose skeleton cannot be rebuilt from the cloned bones
//! - A cloned asset that contains nothing to render
//! - Malformed asset indices and skeleton layouts
//! - Malformed input documents
//!
//! Pose entries that name an unknown bone are intentionally *not* errors:
//! poses are authored generically and applied to varying rigs.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, TroupeError>`.
//!
//! ```rust,ignore
//! use troupe::errors::{TroupeError, Result};
//!
//! fn spawn() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for character cloning and setup.
///
/// None of these are transient: retrying with the same asset yields the same
/// error.
#[derive(Error, Debug)]
pub enum TroupeError {
    // ========================================================================
    // Character Setup Errors
    // ========================================================================
    /// No skinned mesh was found at either supported nesting level of a
    /// cloned asset.
    #[error("No skinned mesh found in asset '{asset}'")]
    MissingMesh {
        /// Name of the asset that was cloned
        asset: String,
    },

    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// A bone named by a source skeleton has no counterpart among the cloned
    /// bones.
    #[error("Cannot bind skinned mesh '{mesh}': bone '{bone}' not found in cloned hierarchy")]
    SkeletonBind {
        /// Name of the skinned mesh being rebound
        mesh: String,
        /// Name of the unresolved bone
        bone: String,
    },

    /// Bone list and inverse bind matrix list are not index-aligned.
    #[error(
        "Skeleton '{skeleton}' has {bones} bones but {inverse_bind_matrices} inverse bind matrices"
    )]
    SkeletonLayout {
        /// Name of the offending skeleton
        skeleton: String,
        /// Number of bones
        bones: usize,
        /// Number of inverse bind matrices
        inverse_bind_matrices: usize,
    },

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// Asset index out of bounds.
    #[error("Asset index out of bounds: {context} (index: {index})")]
    AssetIndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, TroupeError>`.
pub type Result<T> = std::result::Result<T, TroupeError>;
