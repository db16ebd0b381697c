use couture_core::{Color, TextureHandle};

/// What the renderer clears the frame to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundMode {
    /// Hardware clear to a solid colour.
    Color(Color),
    /// Skybox sampled from an environment cube.
    Cube(TextureHandle),
}

impl Default for BackgroundMode {
    fn default() -> Self {
        Self::Color(Color::WHITE)
    }
}

impl BackgroundMode {
    #[must_use]
    pub fn is_cube(&self) -> bool {
        matches!(self, Self::Cube(_))
    }
}
