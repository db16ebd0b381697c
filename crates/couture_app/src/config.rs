//! Viewer configuration.
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes:
//!
//! ```json
//! { "model": "dress.obj", "preset": "IronSkin", "environment": "sea" }
//! ```

use std::path::Path;

use couture_assets::{ENVIRONMENT_NAMES, WHITE_ENVIRONMENT};
use couture_core::{Error, Result};
use couture_studio::{DEFAULT_PRESET, SessionSettings};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory or URL the asset paths below are relative to.
    pub asset_root: String,
    pub model: String,
    /// Optional colour texture for the model.
    pub texture: Option<String>,
    /// Measurement table; the guide stays unavailable without one.
    pub measurements: Option<String>,

    pub preset: String,
    pub environment: String,
    /// Environments loaded at start-up.
    pub environments: Vec<String>,

    pub fov: f32,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping: f32,
    /// Polar freedom either side of the horizon, in degrees.
    pub polar_band_deg: f32,

    pub guide_speed: f32,
    pub guide_radius: f32,

    pub pan_step: f32,
    pub model_offset: Vec2,
    pub model_scale: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let session = SessionSettings::default();
        Self {
            asset_root: "assets".to_string(),
            model: "guy.obj".to_string(),
            texture: None,
            measurements: Some("measurement.json".to_string()),

            preset: DEFAULT_PRESET.to_string(),
            environment: WHITE_ENVIRONMENT.to_string(),
            environments: ENVIRONMENT_NAMES.iter().map(ToString::to_string).collect(),

            fov: session.fov,
            camera_position: session.camera_position,
            camera_target: session.camera_target,
            min_distance: session.min_distance,
            max_distance: session.max_distance,
            damping: session.damping,
            polar_band_deg: session.polar_band.to_degrees(),

            guide_speed: session.guide_speed,
            guide_radius: session.guide_radius,

            pan_step: session.pan_step,
            model_offset: session.model_offset,
            model_scale: session.model_scale,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Format(format!("viewer config: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// The part of the configuration the session needs.
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            preset: self.preset.clone(),
            environment: self.environment.clone(),
            fov: self.fov,
            camera_position: self.camera_position,
            camera_target: self.camera_target,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            damping: self.damping,
            polar_band: self.polar_band_deg.to_radians(),
            guide_speed: self.guide_speed,
            guide_radius: self.guide_radius,
            pan_step: self.pan_step,
            model_offset: self.model_offset,
            model_scale: self.model_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = ViewerConfig::from_json(r#"{ "preset": "IronSkin", "pan_step": 8 }"#).unwrap();
        assert_eq!(config.preset, "IronSkin");
        assert!((config.pan_step - 8.0).abs() < f32::EPSILON);
        assert_eq!(config.model, "guy.obj");
        assert_eq!(config.camera_position, Vec3::new(0.0, 50.0, 130.0));
        assert_eq!(config.environments.len(), ENVIRONMENT_NAMES.len());
    }

    #[test]
    fn polar_band_is_converted_to_radians() {
        let settings = ViewerConfig::default().session_settings();
        assert!((settings.polar_band - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn malformed_json_is_a_format_error() {
        assert!(matches!(ViewerConfig::from_json("{ nope"), Err(Error::Format(_))));
    }
}
