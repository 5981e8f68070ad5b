// src/resources/material/macros.rs

/// API generator for material structs.
///
/// Generates getters and version-bumping setters for plain value fields, the
/// shared `map` slot accessors and the pipeline settings accessors. The
/// target struct must have `settings: MaterialSettings`, `map: TextureSlot`
/// and `version: u64` fields.
#[macro_export]
macro_rules! impl_material_api {
    (
        $struct_name:ident,
        // Values: (field name, type, doc)
        values: [ $(($v_field:ident, $v_type:ty, $v_doc:expr)),* $(,)? ]
    ) => {
        impl $struct_name {

            // ==========================================
            // 1. Settings API
            // ==========================================

            /// Enables or disables alpha blending.
            pub fn set_transparent(&mut self, transparent: bool) {
                if self.settings.transparent != transparent {
                    self.settings.transparent = transparent;
                    self.version = self.version.wrapping_add(1);
                }
            }
            #[must_use]
            pub fn transparent(&self) -> bool {
                self.settings.transparent
            }

            /// Sets face culling (Front/Back/Double).
            pub fn set_side(&mut self, side: $crate::resources::material::Side) {
                if self.settings.side != side {
                    self.settings.side = side;
                    self.version = self.version.wrapping_add(1);
                }
            }
            #[must_use]
            pub fn side(&self) -> $crate::resources::material::Side {
                self.settings.side
            }

            #[must_use]
            pub fn settings(&self) -> &$crate::resources::material::MaterialSettings {
                &self.settings
            }

            /// Monotonic change counter; any setter that changes state bumps it.
            #[must_use]
            pub fn version(&self) -> u64 {
                self.version
            }

            // ==========================================
            // 2. Value accessors
            // ==========================================
            $(
                paste::paste! {
                    #[doc = $v_doc]
                    pub fn [<set_ $v_field>](&mut self, value: $v_type) {
                        if self.$v_field != value {
                            self.$v_field = value;
                            self.version = self.version.wrapping_add(1);
                        }
                    }
                }

                #[doc = $v_doc]
                #[must_use]
                pub fn $v_field(&self) -> $v_type {
                    self.$v_field
                }
            )*

            // ==========================================
            // 3. Color map
            // ==========================================

            /// The color map slot.
            #[must_use]
            pub fn map(&self) -> &$crate::resources::texture::TextureSlot {
                &self.map
            }

            /// Replaces the color map and flags it for upload.
            pub fn set_map(
                &mut self,
                texture: Option<std::sync::Arc<$crate::resources::texture::Texture>>,
            ) {
                self.map.texture = texture;
                self.map.needs_update();
                self.version = self.version.wrapping_add(1);
            }
        }
    };
}
