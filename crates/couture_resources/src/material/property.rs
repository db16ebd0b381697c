//! Material property keys, values and their schema metadata.

use std::collections::BTreeMap;

use couture_core::{Color, TextureHandle};

/// Every property the UI can address on a shaded material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    EnvMap,
    FlatShading,
    Metalness,
    Roughness,
    Wireframe,
    Color,
    Clearcoat,
    Reflectivity,
    Shininess,
}

/// Value shape of a property, with the UI range for scalars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyKind {
    Color,
    Toggle,
    /// `slider_scale` converts the 0–100 integer slider value to `[min, max]`.
    Scalar { min: f32, max: f32, slider_scale: f32 },
    Texture,
}

/// Whether a change can be applied to the live material or needs a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    InPlace,
    Reconstruct,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 9] = [
        Self::EnvMap,
        Self::FlatShading,
        Self::Metalness,
        Self::Roughness,
        Self::Wireframe,
        Self::Color,
        Self::Clearcoat,
        Self::Reflectivity,
        Self::Shininess,
    ];

    /// Name used by the UI and in logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::EnvMap => "envMap",
            Self::FlatShading => "flatShading",
            Self::Metalness => "metalness",
            Self::Roughness => "roughness",
            Self::Wireframe => "wireframe",
            Self::Color => "color",
            Self::Clearcoat => "clearcoat",
            Self::Reflectivity => "reflectivity",
            Self::Shininess => "shininess",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    #[must_use]
    pub fn kind(self) -> PropertyKind {
        let unit = PropertyKind::Scalar {
            min: 0.0,
            max: 1.0,
            slider_scale: 0.01,
        };
        match self {
            Self::EnvMap => PropertyKind::Texture,
            Self::FlatShading | Self::Wireframe => PropertyKind::Toggle,
            Self::Color => PropertyKind::Color,
            Self::Metalness | Self::Roughness | Self::Clearcoat | Self::Reflectivity => unit,
            // Shininess is an exponent; the slider feeds it unscaled.
            Self::Shininess => PropertyKind::Scalar {
                min: 0.0,
                max: 100.0,
                slider_scale: 1.0,
            },
        }
    }

    /// Changing the env-map binding or flat shading alters the shader
    /// variant, so those get a fresh material.
    #[must_use]
    pub fn update_mode(self) -> UpdateMode {
        match self {
            Self::EnvMap | Self::FlatShading => UpdateMode::Reconstruct,
            _ => UpdateMode::InPlace,
        }
    }

    /// Converts a raw 0–100 slider reading to the property's range.
    ///
    /// Returns `None` for non-scalar properties.
    #[must_use]
    pub fn scale_slider(self, raw: f32) -> Option<f32> {
        match self.kind() {
            PropertyKind::Scalar {
                min,
                max,
                slider_scale,
            } => Some((raw * slider_scale).clamp(min, max)),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Color(Color),
    Bool(bool),
    Scalar(f32),
    EnvMap(Option<TextureHandle>),
}

impl PropertyValue {
    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_env_map(&self) -> Option<Option<TextureHandle>> {
        match self {
            Self::EnvMap(h) => Some(*h),
            _ => None,
        }
    }

    /// Whether this value has the shape `kind` expects.
    #[must_use]
    pub fn matches(&self, kind: PropertyKind) -> bool {
        matches!(
            (self, kind),
            (Self::Color(_), PropertyKind::Color)
                | (Self::Bool(_), PropertyKind::Toggle)
                | (Self::Scalar(_), PropertyKind::Scalar { .. })
                | (Self::EnvMap(_), PropertyKind::Texture)
        )
    }
}

impl From<Color> for PropertyValue {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        Self::Scalar(v)
    }
}

impl From<Option<TextureHandle>> for PropertyValue {
    fn from(h: Option<TextureHandle>) -> Self {
        Self::EnvMap(h)
    }
}

/// Ordered property bag, used for snapshots and overrides.
pub type PropertyMap = BTreeMap<PropertyKey, PropertyValue>;
