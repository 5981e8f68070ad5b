//! Core resource definitions
//!
//! Data structures the scene graph references, independent of any GPU
//! backend:
//! - Mesh: geometry + material + morph state
//! - Material: built-in material kinds and settings
//! - Texture: texture references and upload slots
//! - Geometry: shared vertex data and bounds

pub mod mesh;
pub mod material;
pub mod texture;
pub mod geometry;

pub use mesh::{Mesh, MorphInfluences};
pub use material::{
    Material, MaterialData, MaterialFeatures, MaterialSettings, MeshBasicMaterial,
    MeshStandardMaterial, MeshToonMaterial, Side,
};
pub use texture::{Texture, TextureSlot};
pub use geometry::{BoundingBox, Geometry};
