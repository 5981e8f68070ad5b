//! Per-roster configuration.
//!
//! Everything here has a sensible default, so an empty JSON object is a valid
//! settings document.

use glam::{EulerRot, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::resources::material::MeshToonMaterial;

/// Euler order used for bone rotations and facing. Angles stay bound to
/// their axes; the order only decides which axis rotates first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RotationOrder {
    #[default]
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl From<RotationOrder> for EulerRot {
    fn from(order: RotationOrder) -> Self {
        match order {
            RotationOrder::Xyz => EulerRot::XYZ,
            RotationOrder::Xzy => EulerRot::XZY,
            RotationOrder::Yxz => EulerRot::YXZ,
            RotationOrder::Yzx => EulerRot::YZX,
            RotationOrder::Zxy => EulerRot::ZXY,
            RotationOrder::Zyx => EulerRot::ZYX,
        }
    }
}

impl RotationOrder {
    /// Intrinsic rotation from per-axis angles in radians.
    #[must_use]
    pub fn quat(self, x: f32, y: f32, z: f32) -> Quat {
        let (a, b, c) = match self {
            Self::Xyz => (x, y, z),
            Self::Xzy => (x, z, y),
            Self::Yxz => (y, x, z),
            Self::Yzx => (y, z, x),
            Self::Zxy => (z, x, y),
            Self::Zyx => (z, y, x),
        };
        Quat::from_euler(self.into(), a, b, c)
    }
}

/// Look shared by every character: the source material is replaced with a
/// toon material built from these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToonStyle {
    pub color: [f32; 4],
    pub emissive: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub flat_shading: bool,
    pub morph_normals: bool,
}

impl Default for ToonStyle {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            emissive: [0.0; 3],
            specular: [0.0; 3],
            shininess: 0.0,
            flat_shading: false,
            morph_normals: true,
        }
    }
}

impl ToonStyle {
    /// A fresh skinning- and morph-aware toon material without a color map.
    #[must_use]
    pub fn build_material(&self) -> MeshToonMaterial {
        let mut material = MeshToonMaterial::new(Vec4::from_array(self.color));
        material.set_emissive(Vec3::from_array(self.emissive));
        material.set_specular(Vec3::from_array(self.specular));
        material.set_shininess(self.shininess);
        material.set_flat_shading(self.flat_shading);
        material.set_skinning(true);
        material.set_morph_targets(true);
        material.set_morph_normals(self.morph_normals);
        material
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterSettings {
    pub toon: ToonStyle,
    pub rotation_order: RotationOrder,
    /// Recompute inverse bind matrices from the rig's pose at setup, after
    /// the root bone moved under the mesh. When off, the asset's matrices
    /// are kept.
    pub rebind_from_rest_pose: bool,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            toon: ToonStyle::default(),
            rotation_order: RotationOrder::default(),
            rebind_from_rest_pose: true,
        }
    }
}

impl CharacterSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
