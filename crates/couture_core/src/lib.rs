//! Foundational types shared by every Couture crate.

pub mod color;
pub mod errors;
pub mod handles;
pub mod input;
pub mod time;

pub use color::Color;
pub use errors::{Error, Result};
pub use handles::{LightKey, MaterialKey, MeshKey, NodeKey, TextureHandle};
pub use input::{ButtonState, Input, Key, MouseButton};
pub use time::{DEFAULT_MAX_DT, FrameState, Timer};
