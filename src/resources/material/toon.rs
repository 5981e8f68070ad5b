use glam::{Vec3, Vec4};

use crate::impl_material_api;
use crate::resources::material::{MaterialFeatures, MaterialSettings};
use crate::resources::texture::TextureSlot;

/// Cel-shaded material.
///
/// Skinning and morph-target support are part of the material because they
/// select the vertex shader variant.
#[derive(Debug, Clone)]
pub struct MeshToonMaterial {
    pub(crate) color: Vec4,
    pub(crate) emissive: Vec3,
    pub(crate) specular: Vec3,
    pub(crate) shininess: f32,
    pub(crate) flat_shading: bool,
    pub(crate) skinning: bool,
    pub(crate) morph_targets: bool,
    pub(crate) morph_normals: bool,
    pub(crate) map: TextureSlot,
    pub(crate) settings: MaterialSettings,
    pub(crate) version: u64,
}

impl MeshToonMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            emissive: Vec3::ZERO,
            specular: Vec3::ZERO,
            shininess: 0.0,
            flat_shading: false,
            skinning: false,
            morph_targets: false,
            morph_normals: false,
            map: TextureSlot::default(),
            settings: MaterialSettings::default(),
            version: 0,
        }
    }

    #[must_use]
    pub fn features(&self) -> MaterialFeatures {
        let mut features = MaterialFeatures::empty();
        features.set(MaterialFeatures::USE_MAP, self.map.is_some());
        features.set(MaterialFeatures::SKINNING, self.skinning);
        features.set(MaterialFeatures::MORPH_TARGETS, self.morph_targets);
        features.set(MaterialFeatures::MORPH_NORMALS, self.morph_normals);
        features.set(MaterialFeatures::FLAT_SHADING, self.flat_shading);
        features
    }
}

impl_material_api!(
    MeshToonMaterial,
    values: [
        (color,         Vec4, "Diffuse color."),
        (emissive,      Vec3, "Emissive color."),
        (specular,      Vec3, "Specular color."),
        (shininess,     f32,  "Shininess factor."),
        (flat_shading,  bool, "Per-face instead of interpolated normals."),
        (skinning,      bool, "Deform vertices by the bound skeleton."),
        (morph_targets, bool, "Blend morph target positions."),
        (morph_normals, bool, "Blend morph target normals."),
    ]
);

impl Default for MeshToonMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}
