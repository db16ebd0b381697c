use couture_core::Color;
use glam::Vec3;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// Cut-off distance; 0 means unlimited.
    pub distance: f32,
    pub decay: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Ambient,
    Point(PointLight),
}

#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    pub color: Color,
    pub intensity: f32,
    pub kind: LightKind,
    pub cast_shadows: bool,
}

impl Light {
    #[must_use]
    pub fn new_ambient(color: Color, intensity: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Ambient,
            cast_shadows: false,
        }
    }

    #[must_use]
    pub fn new_point(color: Color, intensity: f32, distance: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Point(PointLight {
                distance,
                decay: 1.0,
            }),
            cast_shadows: false,
        }
    }

    #[must_use]
    pub fn with_shadows(mut self) -> Self {
        self.cast_shadows = true;
        self
    }
}

/// A light and where to put it (in stage space).
pub struct LightRig {
    pub name: &'static str,
    pub light: Light,
    pub position: Vec3,
}

/// Base position of the key light before scaling.
pub const KEY_LIGHT_POSITION: Vec3 = Vec3::new(700.0, 2700.0, 250.0);

/// The studio lighting: an adjustable ambient fill, a shadow-casting key
/// light above and in front, and a fill light mirrored through the origin.
#[must_use]
pub fn studio_lights() -> Vec<LightRig> {
    vec![
        LightRig {
            name: "ambient",
            light: Light::new_ambient(Color::WHITE, 0.3),
            position: Vec3::ZERO,
        },
        LightRig {
            name: "key",
            light: Light::new_point(Color::WHITE, 0.7, 1000.0).with_shadows(),
            position: KEY_LIGHT_POSITION * 1.2,
        },
        LightRig {
            name: "fill",
            light: Light::new_point(Color::WHITE, 0.7, 0.0),
            position: -KEY_LIGHT_POSITION,
        },
    ]
}
