//! Per-frame driver between the UI and the renderer.
//!
//! Each [`RenderBridge::frame`] runs, in order: queued commands, keyboard
//! panning, the staged-view commit, guide animation, orbit camera, frame
//! callbacks, world matrices, and finally the draw. Nothing touches the
//! scene while the renderer holds it.

use couture_assets::{LoadTicket, ModelAsset};
use couture_core::{Color, FrameState, Input, MeshKey, Result, TextureHandle};
use couture_resources::{PropertyKey, PropertyValue};
use couture_scene::Scene;
use glam::Vec2;
use slotmap::{SlotMap, new_key_type};

use crate::session::StudioSession;

/// A deferred session operation. Any thread may send one; the bridge runs
/// them on the render thread at the start of the next frame.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    SelectMesh(MeshKey),
    SetProperty { key: PropertyKey, value: PropertyValue },
    /// Raw 0–100 slider reading.
    SetSlider { key: PropertyKey, raw: f32 },
    SwitchFamily,
    Activate,
    ApplyPreset(String),
    SelectMeasurement(usize),
    ClearMeasurement,
    SetBackground(bool),
    ToggleBackground,
    SetEnvironment(String),
    SetWireframe(bool),
    SetWireframeColor(Color),
    SetSkinVisible(bool),
    SetEnvMapEnabled(bool),
    SetMap(Option<TextureHandle>),
    SetModelOffset(Vec2),
    Pan(Vec2),
    SetAmbient { color: Color, intensity: f32 },
    InstallModel(Box<ModelAsset>),
    /// A model from a ticketed load; dropped if a newer load has started
    /// by the time the command runs.
    InstallLoadedModel {
        model: Box<ModelAsset>,
        ticket: LoadTicket,
    },
}

/// Draws a committed scene. Implemented by the GPU backend, or by a logger
/// in headless runs and tests.
pub trait FrameRenderer {
    fn render(&mut self, scene: &Scene, frame: &FrameState) -> Result<()>;
}

new_key_type! {
    pub struct FrameCallbackKey;
}

pub type FrameCallback = Box<dyn FnMut(&mut StudioSession, &FrameState) + Send>;

pub struct RenderBridge {
    session: StudioSession,
    tx: flume::Sender<SessionCommand>,
    rx: flume::Receiver<SessionCommand>,
    callbacks: SlotMap<FrameCallbackKey, FrameCallback>,
    mounted: bool,
    time: f32,
    frame_count: u64,
}

impl RenderBridge {
    /// Mounts a session. Frames run until [`unmount`](Self::unmount).
    #[must_use]
    pub fn mount(session: StudioSession) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            session,
            tx,
            rx,
            callbacks: SlotMap::with_key(),
            mounted: true,
            time: 0.0,
            frame_count: 0,
        }
    }

    /// A handle for queueing commands, e.g. from a loader task.
    #[must_use]
    pub fn sender(&self) -> flume::Sender<SessionCommand> {
        self.tx.clone()
    }

    pub fn send(&self, command: SessionCommand) {
        // The bridge owns a receiver, so the channel cannot be disconnected.
        let _ = self.tx.send(command);
    }

    #[must_use]
    pub fn session(&self) -> &StudioSession {
        &self.session
    }

    /// Direct access for handlers that already run between frames.
    pub fn session_mut(&mut self) -> &mut StudioSession {
        &mut self.session
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn register_frame_callback(
        &mut self,
        callback: impl FnMut(&mut StudioSession, &FrameState) + Send + 'static,
    ) -> FrameCallbackKey {
        self.callbacks.insert(Box::new(callback))
    }

    pub fn deregister_frame_callback(&mut self, key: FrameCallbackKey) -> bool {
        self.callbacks.remove(key).is_some()
    }

    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Stops the loop: callbacks are dropped and queued commands discarded.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.callbacks.clear();
        let dropped = self.rx.drain().count();
        if dropped > 0 {
            log::debug!("Discarded {dropped} queued commands on unmount");
        }
        self.mounted = false;
        log::info!("View unmounted after {} frames", self.frame_count);
    }

    /// Consumes the bridge and hands back the session.
    #[must_use]
    pub fn into_session(mut self) -> StudioSession {
        self.unmount();
        self.session
    }

    /// Runs one frame. Returns `None` once unmounted.
    ///
    /// Command and commit failures are logged and the frame still draws the
    /// last consistent state; only renderer errors are returned.
    pub fn frame(
        &mut self,
        input: &Input,
        dt: f32,
        renderer: &mut dyn FrameRenderer,
    ) -> Result<Option<FrameState>> {
        if !self.mounted {
            return Ok(None);
        }

        for command in self.rx.try_iter() {
            if let Err(e) = self.session.apply(command) {
                log::warn!("Command failed: {e}");
            }
        }

        self.session.handle_keys(input.key_presses());

        if let Err(e) = self.session.commit() {
            log::warn!("Commit failed: {e}");
        }

        self.session.advance_guide();
        self.session.update_camera(input, dt);

        self.time += dt;
        self.frame_count += 1;
        let state = FrameState {
            time: self.time,
            dt,
            frame_count: self.frame_count,
        };

        for callback in self.callbacks.values_mut() {
            callback(&mut self.session, &state);
        }

        let scene = self.session.scene_mut();
        scene.update_matrix_world();
        renderer.render(scene, &state)?;
        Ok(Some(state))
    }
}
