use std::sync::Arc;

use smallvec::SmallVec;

use crate::resources::geometry::Geometry;
use crate::resources::material::Material;

/// Morph influence slots; body-shape rigs use three, inline storage covers
/// the common case without a heap allocation.
pub type MorphInfluences = SmallVec<[f32; 4]>;

/// Mesh component: shared geometry plus per-instance material and morph
/// state.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,

    // === Resource references ===
    pub geometry: Arc<Geometry>,
    pub material: Material,

    // === Instance-specific settings ===
    pub visible: bool,
    pub cast_shadows: bool,
    pub receive_shadows: bool,

    morph_target_influences: MorphInfluences,
}

impl Mesh {
    /// Creates a mesh with one zeroed influence slot per morph target.
    #[must_use]
    pub fn new(geometry: Arc<Geometry>, material: Material) -> Self {
        let morph_target_influences = SmallVec::from_elem(0.0, geometry.morph_target_count());
        Self {
            name: "Mesh".to_string(),
            geometry,
            material,
            visible: true,
            cast_shadows: true,
            receive_shadows: true,
            morph_target_influences,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    #[inline]
    #[must_use]
    pub fn morph_target_influences(&self) -> &[f32] {
        &self.morph_target_influences
    }

    /// Writes one influence slot, growing the table with zeros when the slot
    /// lies beyond the geometry's declared morph targets.
    pub fn set_morph_target_influence(&mut self, slot: usize, weight: f32) {
        if slot >= self.morph_target_influences.len() {
            log::warn!(
                "Mesh '{}' declares {} morph targets, writing influence slot {slot}",
                self.name,
                self.geometry.morph_target_count()
            );
            self.morph_target_influences.resize(slot + 1, 0.0);
        }
        self.morph_target_influences[slot] = weight;
    }

    /// Copies `weights` into the leading influence slots.
    pub fn set_morph_target_influences(&mut self, weights: &[f32]) {
        for (slot, &weight) in weights.iter().enumerate() {
            self.set_morph_target_influence(slot, weight);
        }
    }
}
