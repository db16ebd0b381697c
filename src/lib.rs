#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Couture: an interactive garment and body viewer core.
//!
//! The member crates are re-exported under short names; the most used types
//! are also available at the top level.

pub use couture_app as app;
pub use couture_assets as assets;
pub use couture_core as base;
pub use couture_resources as resources;
pub use couture_scene as scene;
pub use couture_studio as studio;

pub use couture_app::{Viewer, ViewerConfig};
pub use couture_assets::{AssetServer, EnvironmentSet, ModelAsset, ModelLoader};
pub use couture_core::{Color, Error, Input, Result};
pub use couture_resources::{Geometry, Material, MaterialFamily, PropertyKey, PropertyValue, Texture};
pub use couture_scene::{MeasurementTable, OrbitControls, Scene};
pub use couture_studio::{
    FrameRenderer, MaterialRegistry, RenderBridge, SessionCommand, StudioSession, StylePreset,
    find_preset,
};

pub use glam;
