//! The interactive core of the Couture viewer.
//!
//! [`MaterialRegistry`] keeps the selected mesh and every sync target on one
//! material. [`StudioSession`] owns the scene together with the registry
//! and the staged view state. [`RenderBridge`] drives a session frame by
//! frame and feeds it commands from other threads.

pub mod bridge;
pub mod controls;
pub mod keyboard;
pub mod presets;
pub mod registry;
pub mod samples;
pub mod session;
pub mod view;

pub use bridge::{FrameCallbackKey, FrameRenderer, RenderBridge, SessionCommand};
pub use controls::{ColorPicker, Control, ControlInput, Slider, Toggle, control_for, controls};
pub use presets::{DEFAULT_PRESET, EnvMapping, PRESETS, SkinLook, StylePreset, find_preset, preset_names};
pub use registry::MaterialRegistry;
pub use samples::SampleShapes;
pub use session::{GROUND_COLOR, PendingChanges, SessionSettings, StudioSession};
pub use view::{LoadedModel, ViewSettings};
