use glam::{Vec3, Vec4};

use crate::impl_material_api;
use crate::resources::material::{MaterialFeatures, MaterialSettings};
use crate::resources::texture::TextureSlot;

/// Metallic-roughness PBR material, the usual output of asset loaders.
#[derive(Debug, Clone)]
pub struct MeshStandardMaterial {
    pub(crate) color: Vec4,
    pub(crate) emissive: Vec3,
    pub(crate) roughness: f32,
    pub(crate) metalness: f32,
    pub(crate) map: TextureSlot,
    pub(crate) normal_map: TextureSlot,
    pub(crate) settings: MaterialSettings,
    pub(crate) version: u64,
}

impl MeshStandardMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            emissive: Vec3::ZERO,
            roughness: 1.0,
            metalness: 0.0,
            map: TextureSlot::default(),
            normal_map: TextureSlot::default(),
            settings: MaterialSettings::default(),
            version: 0,
        }
    }

    #[must_use]
    pub fn normal_map(&self) -> &TextureSlot {
        &self.normal_map
    }

    pub fn set_normal_map(&mut self, slot: TextureSlot) {
        self.normal_map = slot;
        self.version = self.version.wrapping_add(1);
    }

    #[must_use]
    pub fn features(&self) -> MaterialFeatures {
        let mut features = MaterialFeatures::empty();
        features.set(MaterialFeatures::USE_MAP, self.map.is_some());
        features.set(MaterialFeatures::USE_NORMAL_MAP, self.normal_map.is_some());
        features
    }
}

impl_material_api!(
    MeshStandardMaterial,
    values: [
        (color,     Vec4, "Base color."),
        (emissive,  Vec3, "Emissive color."),
        (roughness, f32,  "Roughness factor."),
        (metalness, f32,  "Metalness factor."),
    ]
);

impl Default for MeshStandardMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}
