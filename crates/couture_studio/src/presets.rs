//! Named skins the user can switch between.

use couture_core::{Color, Error, Result};
use couture_resources::{Material, MaterialFamily, PropertyKey, PropertyMap, PropertyValue};

/// Which cube variant of the current environment a preset binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMapping {
    Reflection,
    Refraction,
    /// Leave whatever env map the meshes already have.
    Untouched,
}

/// Base surface a preset puts on the model before overrides.
#[derive(Debug, Clone, Copy)]
pub struct SkinLook {
    pub color: Color,
    pub scalars: &'static [(PropertyKey, f32)],
}

/// A named, immutable bundle of material and view settings.
#[derive(Debug, Clone, Copy)]
pub struct StylePreset {
    pub name: &'static str,
    pub family: MaterialFamily,
    pub look: SkinLook,
    pub wireframe_enabled: bool,
    /// `None` keeps the current wireframe colour.
    pub wireframe_color: Option<Color>,
    pub skin_visible: bool,
    /// `None` keeps the current env-map toggle.
    pub env_map_enabled: Option<bool>,
    pub env_mapping: EnvMapping,
}

impl StylePreset {
    /// The preset's base material, before env maps and overrides.
    #[must_use]
    pub fn material(&self) -> Material {
        let mut props = PropertyMap::new();
        props.insert(PropertyKey::Color, PropertyValue::Color(self.look.color));
        for (key, value) in self.look.scalars {
            props.insert(*key, PropertyValue::Scalar(*value));
        }
        Material::from_properties(self.family, &props).with_name(self.name)
    }
}

pub const DEFAULT_PRESET: &str = "OriginSkin";

pub const PRESETS: [StylePreset; 7] = [
    StylePreset {
        name: "IronSkin",
        family: MaterialFamily::Physical,
        look: SkinLook {
            color: Color::from_hex(0xcccccc),
            scalars: &[
                (PropertyKey::Metalness, 0.9),
                (PropertyKey::Roughness, 0.2),
                (PropertyKey::Reflectivity, 0.8),
            ],
        },
        wireframe_enabled: false,
        wireframe_color: None,
        skin_visible: true,
        env_map_enabled: Some(true),
        env_mapping: EnvMapping::Reflection,
    },
    StylePreset {
        name: "HumanBodySkinInMesh",
        family: MaterialFamily::Phong,
        look: SkinLook {
            color: Color::from_hex(0xe0ac69),
            scalars: &[(PropertyKey::Shininess, 20.0), (PropertyKey::Reflectivity, 0.1)],
        },
        wireframe_enabled: false,
        wireframe_color: Some(Color::BLACK),
        skin_visible: true,
        env_map_enabled: None,
        env_mapping: EnvMapping::Reflection,
    },
    StylePreset {
        name: "BlueWithPurpleEffect",
        family: MaterialFamily::Physical,
        look: SkinLook {
            color: Color::from_hex(0x6a5acd),
            scalars: &[
                (PropertyKey::Metalness, 0.3),
                (PropertyKey::Roughness, 0.4),
                (PropertyKey::Clearcoat, 0.6),
            ],
        },
        wireframe_enabled: false,
        wireframe_color: None,
        skin_visible: true,
        env_map_enabled: None,
        env_mapping: EnvMapping::Untouched,
    },
    StylePreset {
        name: "BlueWithLightEffectInMesh",
        family: MaterialFamily::Physical,
        look: SkinLook {
            color: Color::from_hex(0x05cfe8),
            scalars: &[
                (PropertyKey::Metalness, 0.1),
                (PropertyKey::Roughness, 0.1),
                (PropertyKey::Reflectivity, 0.9),
            ],
        },
        wireframe_enabled: false,
        wireframe_color: Some(Color::from_hex(0x05cfe8)),
        skin_visible: true,
        env_map_enabled: Some(true),
        env_mapping: EnvMapping::Refraction,
    },
    StylePreset {
        name: "BlueWithLightEffect",
        family: MaterialFamily::Physical,
        look: SkinLook {
            color: Color::from_hex(0x05cfe8),
            scalars: &[(PropertyKey::Metalness, 0.1), (PropertyKey::Roughness, 0.1)],
        },
        wireframe_enabled: false,
        wireframe_color: Some(Color::WHITE),
        skin_visible: true,
        env_map_enabled: Some(false),
        env_mapping: EnvMapping::Refraction,
    },
    StylePreset {
        name: "BlackSkin",
        family: MaterialFamily::Physical,
        look: SkinLook {
            color: Color::from_hex(0x111111),
            scalars: &[(PropertyKey::Metalness, 0.5), (PropertyKey::Roughness, 0.3)],
        },
        wireframe_enabled: false,
        wireframe_color: None,
        skin_visible: true,
        env_map_enabled: Some(true),
        env_mapping: EnvMapping::Reflection,
    },
    StylePreset {
        name: "OriginSkin",
        family: MaterialFamily::Physical,
        look: SkinLook {
            color: Color::WHITE,
            scalars: &[],
        },
        wireframe_enabled: true,
        wireframe_color: Some(Color::BLACK),
        skin_visible: true,
        env_map_enabled: Some(false),
        env_mapping: EnvMapping::Reflection,
    },
];

/// Looks a preset up by its exact name.
pub fn find_preset(name: &str) -> Result<&'static StylePreset> {
    PRESETS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| Error::UnknownPreset(name.to_string()))
}

#[must_use]
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name)
}
