use couture_core::{Color, TextureHandle};

/// Physically based material with clearcoat.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPhysicalMaterial {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub reflectivity: f32,
    pub env_map: Option<TextureHandle>,
    pub flat_shading: bool,
    pub wireframe: bool,
    /// Albedo texture; not part of the editable schema.
    pub map: Option<TextureHandle>,
}

impl MeshPhysicalMaterial {
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

impl Default for MeshPhysicalMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 1.0,
            clearcoat: 0.0,
            reflectivity: 0.5,
            env_map: None,
            flat_shading: false,
            wireframe: false,
            map: None,
        }
    }
}
