//! Per-character input set, as delivered by the UI layer.

use serde::{Deserialize, Serialize};

use crate::character::pose::Pose;
use crate::errors::Result;

/// Position in world axes, where `y` is depth and `z` is vertical.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPosition {
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Converts to render axes: input `y` drives render `z`, input `z`
    /// drives render `y`.
    #[inline]
    #[must_use]
    pub fn to_render(self) -> glam::Vec3 {
        glam::Vec3::new(self.x, self.z, self.y)
    }
}

/// Facing about the vertical axis, in radians.
///
/// Accepts a bare number or an object carrying `y`; other fields of the
/// object are ignored. `0` is a valid yaw in both shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Yaw {
    Scalar(f32),
    Vector {
        y: f32,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        z: f32,
    },
}

impl Yaw {
    #[inline]
    #[must_use]
    pub fn angle(self) -> f32 {
        match self {
            Self::Scalar(a) | Self::Vector { y: a, .. } => a,
        }
    }
}

impl Default for Yaw {
    fn default() -> Self {
        Self::Scalar(0.0)
    }
}

impl From<f32> for Yaw {
    fn from(angle: f32) -> Self {
        Self::Scalar(angle)
    }
}

/// Body-shape blend weights, written to morph slots 0, 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphWeights {
    pub mesomorphic: f32,
    pub ectomorphic: f32,
    pub endomorphic: f32,
}

impl MorphWeights {
    #[must_use]
    pub fn new(mesomorphic: f32, ectomorphic: f32, endomorphic: f32) -> Self {
        Self {
            mesomorphic,
            ectomorphic,
            endomorphic,
        }
    }

    /// Weights in influence slot order.
    #[inline]
    #[must_use]
    pub fn slots(self) -> [f32; 3] {
        [self.mesomorphic, self.ectomorphic, self.endomorphic]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterProps {
    pub character_id: String,
    pub character_type: String,
    pub position: WorldPosition,
    pub facing_rotation: Yaw,
    /// Target rendered height; `None` keeps the asset's own size.
    pub height: Option<f32>,
    pub morph_weights: MorphWeights,
    pub pose: Pose,
    pub model_settings: serde_json::Map<String, serde_json::Value>,
}

impl Default for CharacterProps {
    fn default() -> Self {
        Self {
            character_id: String::new(),
            character_type: "character".to_string(),
            position: WorldPosition::default(),
            facing_rotation: Yaw::default(),
            height: None,
            morph_weights: MorphWeights::default(),
            pose: Pose::default(),
            model_settings: serde_json::Map::new(),
        }
    }
}

impl CharacterProps {
    #[must_use]
    pub fn new(character_id: &str) -> Self {
        Self {
            character_id: character_id.to_string(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
