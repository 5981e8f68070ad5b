use glam::Vec4;

use crate::impl_material_api;
use crate::resources::material::{MaterialFeatures, MaterialSettings};
use crate::resources::texture::TextureSlot;

/// Unlit material.
#[derive(Debug, Clone)]
pub struct MeshBasicMaterial {
    pub(crate) color: Vec4,
    pub(crate) map: TextureSlot,
    pub(crate) settings: MaterialSettings,
    pub(crate) version: u64,
}

impl MeshBasicMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            map: TextureSlot::default(),
            settings: MaterialSettings::default(),
            version: 0,
        }
    }

    #[must_use]
    pub fn features(&self) -> MaterialFeatures {
        let mut features = MaterialFeatures::empty();
        features.set(MaterialFeatures::USE_MAP, self.map.is_some());
        features
    }
}

impl_material_api!(
    MeshBasicMaterial,
    values: [
        (color, Vec4, "Base color."),
    ]
);

impl Default for MeshBasicMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}
