use couture_core::{Color, TextureHandle};

/// Blinn-Phong material.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPhongMaterial {
    pub color: Color,
    pub shininess: f32,
    pub reflectivity: f32,
    pub env_map: Option<TextureHandle>,
    pub flat_shading: bool,
    pub wireframe: bool,
    pub map: Option<TextureHandle>,
}

impl MeshPhongMaterial {
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

impl Default for MeshPhongMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            shininess: 30.0,
            reflectivity: 1.0,
            env_map: None,
            flat_shading: false,
            wireframe: false,
            map: None,
        }
    }
}
