use std::sync::Arc;

use uuid::Uuid;

/// Image-backed texture as produced by the asset loader.
///
/// Pixel data is owned by the loader's image store; the character core only
/// moves texture references between materials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    #[must_use]
    pub fn new_2d(name: Option<&str>, width: u32, height: u32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.map(str::to_string),
            width,
            height,
        }
    }
}

/// A material's reference to a texture plus its upload version.
///
/// Bumping `version` asks the renderer to (re)upload the texture for this
/// material even when the texture itself is shared and unchanged.
#[derive(Debug, Clone, Default)]
pub struct TextureSlot {
    pub texture: Option<Arc<Texture>>,
    pub version: u64,
}

impl TextureSlot {
    #[must_use]
    pub fn new(texture: Arc<Texture>) -> Self {
        Self {
            texture: Some(texture),
            version: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_some(&self) -> bool {
        self.texture.is_some()
    }

    /// Flags the slot for re-upload.
    pub fn needs_update(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
