//! Hosting for the Couture viewer.
//!
//! [`Viewer`] wires an [`AssetServer`](couture_assets::AssetServer), a frame
//! [`Timer`](couture_core::Timer) and the input state to a mounted
//! [`RenderBridge`](couture_studio::RenderBridge). Drawing is delegated to a
//! [`FrameRenderer`](couture_studio::FrameRenderer).

pub mod config;
pub mod viewer;

#[cfg(feature = "winit")]
pub mod input_adapter;

pub use config::ViewerConfig;
pub use viewer::Viewer;
