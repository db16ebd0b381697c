//! Control descriptors: one per schema property, looked up by key.
//!
//! A control knows its label, whether it applies to the active family, and
//! how to turn a raw widget reading into a [`SessionCommand`].

use couture_core::{Color, Error, Result};
use couture_resources::{MaterialFamily, PropertyKey, PropertyValue};

use crate::bridge::SessionCommand;

/// A raw reading from a UI widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlInput<'a> {
    /// Integer slider position, 0–100.
    Slider(f32),
    Toggle(bool),
    /// Colour picker text, e.g. `#ff8800`.
    Color(&'a str),
}

pub trait Control: Sync {
    fn key(&self) -> PropertyKey;

    fn label(&self) -> &'static str;

    fn is_enabled(&self, family: MaterialFamily) -> bool {
        family.supports(self.key())
    }

    fn translate(&self, input: ControlInput<'_>) -> Result<SessionCommand>;
}

fn wrong_input(key: PropertyKey, expected: &'static str) -> Error {
    Error::PropertyType {
        property: key.name(),
        expected,
    }
}

pub struct Slider {
    pub key: PropertyKey,
    pub label: &'static str,
}

impl Control for Slider {
    fn key(&self) -> PropertyKey {
        self.key
    }

    fn label(&self) -> &'static str {
        self.label
    }

    fn translate(&self, input: ControlInput<'_>) -> Result<SessionCommand> {
        match input {
            ControlInput::Slider(raw) => Ok(SessionCommand::SetSlider { key: self.key, raw }),
            _ => Err(wrong_input(self.key, "number")),
        }
    }
}

pub struct Toggle {
    pub key: PropertyKey,
    pub label: &'static str,
}

impl Control for Toggle {
    fn key(&self) -> PropertyKey {
        self.key
    }

    fn label(&self) -> &'static str {
        self.label
    }

    fn translate(&self, input: ControlInput<'_>) -> Result<SessionCommand> {
        let ControlInput::Toggle(on) = input else {
            return Err(wrong_input(self.key, "boolean"));
        };
        Ok(match self.key {
            // The env-map switch binds or unbinds the current environment,
            // which is view state rather than a raw texture handle.
            PropertyKey::EnvMap => SessionCommand::SetEnvMapEnabled(on),
            key => SessionCommand::SetProperty {
                key,
                value: PropertyValue::Bool(on),
            },
        })
    }
}

pub struct ColorPicker {
    pub key: PropertyKey,
    pub label: &'static str,
}

impl Control for ColorPicker {
    fn key(&self) -> PropertyKey {
        self.key
    }

    fn label(&self) -> &'static str {
        self.label
    }

    /// Malformed colour text falls back to black.
    fn translate(&self, input: ControlInput<'_>) -> Result<SessionCommand> {
        match input {
            ControlInput::Color(text) => Ok(SessionCommand::SetProperty {
                key: self.key,
                value: PropertyValue::Color(Color::parse(text)),
            }),
            _ => Err(wrong_input(self.key, "color")),
        }
    }
}

static ENV_MAP: Toggle = Toggle {
    key: PropertyKey::EnvMap,
    label: "Environment map",
};
static FLAT_SHADING: Toggle = Toggle {
    key: PropertyKey::FlatShading,
    label: "Flat shading",
};
static WIREFRAME: Toggle = Toggle {
    key: PropertyKey::Wireframe,
    label: "Wireframe",
};
static COLOR: ColorPicker = ColorPicker {
    key: PropertyKey::Color,
    label: "Color",
};
static METALNESS: Slider = Slider {
    key: PropertyKey::Metalness,
    label: "Metalness",
};
static ROUGHNESS: Slider = Slider {
    key: PropertyKey::Roughness,
    label: "Roughness",
};
static CLEARCOAT: Slider = Slider {
    key: PropertyKey::Clearcoat,
    label: "Clearcoat",
};
static REFLECTIVITY: Slider = Slider {
    key: PropertyKey::Reflectivity,
    label: "Reflectivity",
};
static SHININESS: Slider = Slider {
    key: PropertyKey::Shininess,
    label: "Shininess",
};

/// The control for a property. Every key has exactly one.
#[must_use]
pub fn control_for(key: PropertyKey) -> &'static dyn Control {
    match key {
        PropertyKey::EnvMap => &ENV_MAP,
        PropertyKey::FlatShading => &FLAT_SHADING,
        PropertyKey::Wireframe => &WIREFRAME,
        PropertyKey::Color => &COLOR,
        PropertyKey::Metalness => &METALNESS,
        PropertyKey::Roughness => &ROUGHNESS,
        PropertyKey::Clearcoat => &CLEARCOAT,
        PropertyKey::Reflectivity => &REFLECTIVITY,
        PropertyKey::Shininess => &SHININESS,
    }
}

/// Controls to show for `family`, in schema order.
pub fn controls(family: MaterialFamily) -> impl Iterator<Item = &'static dyn Control> {
    family.schema().iter().map(|&key| control_for(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_a_matching_control() {
        for key in PropertyKey::ALL {
            assert_eq!(control_for(key).key(), key);
        }
    }

    #[test]
    fn enablement_follows_the_family_schema() {
        let shininess = control_for(PropertyKey::Shininess);
        assert!(shininess.is_enabled(MaterialFamily::Phong));
        assert!(!shininess.is_enabled(MaterialFamily::Physical));
        assert_eq!(controls(MaterialFamily::Phong).count(), 6);
    }

    #[test]
    fn inputs_translate_to_commands() {
        let cmd = control_for(PropertyKey::Roughness)
            .translate(ControlInput::Slider(50.0))
            .unwrap();
        assert!(matches!(
            cmd,
            SessionCommand::SetSlider { key: PropertyKey::Roughness, raw } if (raw - 50.0).abs() < f32::EPSILON
        ));

        let cmd = control_for(PropertyKey::Color)
            .translate(ControlInput::Color("not a colour"))
            .unwrap();
        assert!(matches!(
            cmd,
            SessionCommand::SetProperty { value: PropertyValue::Color(c), .. } if c == Color::BLACK
        ));

        assert!(matches!(
            control_for(PropertyKey::EnvMap).translate(ControlInput::Toggle(true)),
            Ok(SessionCommand::SetEnvMapEnabled(true))
        ));
        assert!(control_for(PropertyKey::Wireframe)
            .translate(ControlInput::Slider(1.0))
            .is_err());
    }
}
