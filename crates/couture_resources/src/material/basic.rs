use couture_core::{Color, TextureHandle};

/// Unlit material, used for the ground disc.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBasicMaterial {
    pub color: Color,
    pub opacity: f32,
    pub env_map: Option<TextureHandle>,
    pub map: Option<TextureHandle>,
}

impl MeshBasicMaterial {
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            env_map: None,
            map: None,
        }
    }
}

impl Default for MeshBasicMaterial {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

/// Flat-coloured line segments (wireframe overlays).
#[derive(Debug, Clone, PartialEq)]
pub struct LineBasicMaterial {
    pub color: Color,
    pub line_width: f32,
}

impl LineBasicMaterial {
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            color,
            line_width: 1.0,
        }
    }
}

/// Animated two-colour gradient swept along a tube.
///
/// Alpha is `step(uv.x, time) * opacity`, so the tube appears to draw
/// itself as `time` runs from 0 to 1 and then holds.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideLineMaterial {
    pub color1: Color,
    pub color2: Color,
    pub opacity: f32,
    pub time: f32,
}

impl GuideLineMaterial {
    pub const DEFAULT_COLOR1: Color = Color::new(0x5d as f32 / 255.0, 0xef as f32 / 255.0, 0x3a as f32 / 255.0);
    pub const DEFAULT_COLOR2: Color = Color::new(0.0, 0xe9 as f32 / 255.0, 1.0);

    #[must_use]
    pub fn new(opacity: f32) -> Self {
        Self {
            color1: Self::DEFAULT_COLOR1,
            color2: Self::DEFAULT_COLOR2,
            opacity,
            time: 0.0,
        }
    }

    /// Colour and alpha at path coordinate `u`, as the shader computes them.
    ///
    /// The colour ping-pongs between the two ends along `(u - time) mod 1`;
    /// alpha is `step(u, time)`.
    #[must_use]
    pub fn shade(&self, u: f32) -> (Color, f32) {
        let mut t = (u - self.time).rem_euclid(1.0) * 2.0;
        if t >= 1.0 {
            t = 2.0 - t;
        }
        let alpha = if self.time >= u { 1.0 } else { 0.0 };
        (self.color1.lerp(&self.color2, t), alpha * self.opacity)
    }
}
