use super::property::{PropertyKey, PropertyMap, PropertyValue};

/// Shading model a registry-managed material belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialFamily {
    #[default]
    Physical,
    Phong,
}

const PHYSICAL_SCHEMA: &[PropertyKey] = &[
    PropertyKey::EnvMap,
    PropertyKey::FlatShading,
    PropertyKey::Metalness,
    PropertyKey::Roughness,
    PropertyKey::Wireframe,
    PropertyKey::Color,
    PropertyKey::Clearcoat,
    PropertyKey::Reflectivity,
];

const PHONG_SCHEMA: &[PropertyKey] = &[
    PropertyKey::Reflectivity,
    PropertyKey::Shininess,
    PropertyKey::Color,
    PropertyKey::EnvMap,
    PropertyKey::FlatShading,
    PropertyKey::Wireframe,
];

impl MaterialFamily {
    pub const ALL: [MaterialFamily; 2] = [Self::Physical, Self::Phong];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Physical => "Physical",
            Self::Phong => "Phong",
        }
    }

    /// Properties this family understands, in UI order.
    #[must_use]
    pub fn schema(self) -> &'static [PropertyKey] {
        match self {
            Self::Physical => PHYSICAL_SCHEMA,
            Self::Phong => PHONG_SCHEMA,
        }
    }

    #[must_use]
    pub fn supports(self, key: PropertyKey) -> bool {
        self.schema().contains(&key)
    }

    /// The other family.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Physical => Self::Phong,
            Self::Phong => Self::Physical,
        }
    }

    /// Values applied when switching into this family.
    #[must_use]
    pub fn switch_defaults(self) -> &'static [(PropertyKey, PropertyValue)] {
        match self {
            Self::Physical => &[(PropertyKey::Metalness, PropertyValue::Scalar(0.0))],
            Self::Phong => &[(PropertyKey::Shininess, PropertyValue::Scalar(0.0))],
        }
    }

    /// Keeps only the entries of `props` this family supports.
    #[must_use]
    pub fn project(self, props: &PropertyMap) -> PropertyMap {
        props
            .iter()
            .filter(|(k, _)| self.supports(**k))
            .map(|(k, v)| (*k, *v))
            .collect()
    }
}

impl std::fmt::Display for MaterialFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
