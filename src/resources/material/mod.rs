mod macros;
mod basic;
mod standard;
mod toon;

pub use basic::MeshBasicMaterial;
pub use standard::MeshStandardMaterial;
pub use toon::MeshToonMaterial;

use std::borrow::Cow;
use std::ops::Deref;

use bitflags::bitflags;
use uuid::Uuid;

use crate::resources::texture::TextureSlot;

// Shader variant options
bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFeatures: u32 {
        const USE_MAP        = 1 << 0;
        const USE_NORMAL_MAP = 1 << 1;
        const SKINNING       = 1 << 2;
        const MORPH_TARGETS  = 1 << 3;
        const MORPH_NORMALS  = 1 << 4;
        const FLAT_SHADING   = 1 << 5;
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Material settings (pipeline state)
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MaterialSettings {
    pub transparent: bool,
    pub depth_write: bool,
    pub depth_test: bool,
    pub side: Side,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            transparent: false,
            depth_write: true,
            depth_test: true,
            side: Side::Front,
        }
    }
}

// ============================================================================
// Material Data Enum
// ============================================================================

/// Built-in material kinds, statically dispatched.
#[derive(Debug, Clone)]
pub enum MaterialData {
    Basic(MeshBasicMaterial),
    Standard(MeshStandardMaterial),
    Toon(MeshToonMaterial),
}

impl MaterialData {
    #[must_use]
    pub fn shader_name(&self) -> &'static str {
        match self {
            Self::Basic(_) => "mesh_basic",
            Self::Standard(_) => "mesh_standard",
            Self::Toon(_) => "mesh_toon",
        }
    }

    #[must_use]
    pub fn features(&self) -> MaterialFeatures {
        match self {
            Self::Basic(m) => m.features(),
            Self::Standard(m) => m.features(),
            Self::Toon(m) => m.features(),
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        match self {
            Self::Basic(m) => m.version(),
            Self::Standard(m) => m.version(),
            Self::Toon(m) => m.version(),
        }
    }

    /// The color map slot; every built-in material has one.
    #[must_use]
    pub fn map(&self) -> &TextureSlot {
        match self {
            Self::Basic(m) => m.map(),
            Self::Standard(m) => m.map(),
            Self::Toon(m) => m.map(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &MaterialSettings {
        match self {
            Self::Basic(m) => m.settings(),
            Self::Standard(m) => m.settings(),
            Self::Toon(m) => m.settings(),
        }
    }
}

// ============================================================================
// Material Wrapper
// ============================================================================

#[derive(Debug, Clone)]
pub struct Material {
    pub uuid: Uuid,
    pub name: Option<Cow<'static, str>>,
    pub data: MaterialData,
}

impl Material {
    #[must_use]
    pub fn new(data: MaterialData) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            data,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn as_toon(&self) -> Option<&MeshToonMaterial> {
        match &self.data {
            MaterialData::Toon(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_toon_mut(&mut self) -> Option<&mut MeshToonMaterial> {
        match &mut self.data {
            MaterialData::Toon(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_standard(&self) -> Option<&MeshStandardMaterial> {
        match &self.data {
            MaterialData::Standard(m) => Some(m),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions from concrete materials
// ============================================================================

impl From<MeshBasicMaterial> for Material {
    fn from(data: MeshBasicMaterial) -> Self {
        Material::new(MaterialData::Basic(data))
    }
}

impl From<MeshStandardMaterial> for Material {
    fn from(data: MeshStandardMaterial) -> Self {
        Material::new(MaterialData::Standard(data))
    }
}

impl From<MeshToonMaterial> for Material {
    fn from(data: MeshToonMaterial) -> Self {
        Material::new(MaterialData::Toon(data))
    }
}

impl Deref for Material {
    type Target = MaterialData;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
