//! The viewer session: one scene, its material registry and the view state
//! the UI edits.
//!
//! A session is created when a view mounts and dropped when it unmounts.
//! UI handlers get it by `&mut` (directly or through the command queue of
//! the [`RenderBridge`](crate::bridge::RenderBridge)), so every mutation
//! happens between frames.
//!
//! Registry edits (properties, family switch) apply immediately. View edits
//! (presets, toggles, background, offset) are staged and take effect
//! together in [`StudioSession::commit`], which the bridge calls right
//! before drawing.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use bitflags::bitflags;
use couture_assets::{EnvironmentCubes, EnvironmentSet, ModelAsset, WHITE_ENVIRONMENT};
use couture_core::{Color, Error, Input, Key, LightKey, MeshKey, NodeKey, Result, TextureHandle};
use couture_resources::primitives::create_circle;
use couture_resources::{Material, PropertyKey, PropertyValue};
use couture_scene::{
    BackgroundMode, GuideLine, LightKind, MeasurementTable, Mesh, MeshRole, Node, OrbitControls,
    Scene, studio_lights,
};
use glam::{Vec2, Vec3};

use crate::bridge::SessionCommand;
use crate::keyboard;
use crate::presets::find_preset;
use crate::registry::MaterialRegistry;
use crate::samples::SampleShapes;
use crate::view::{LoadedModel, ViewSettings};

pub const GROUND_COLOR: Color = Color::from_hex(0x00cc_cccc);
const GROUND_RADIUS: f32 = 600.0;
const GROUND_SEGMENTS: u32 = 6;
const GROUND_SCALE: f32 = 4.0;

bitflags! {
    /// Staged changes waiting for the next commit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PendingChanges: u8 {
        /// Fresh preset materials on the model.
        const RESTYLE    = 1 << 0;
        /// Wireframe overlay, skin switch, env map and recapture.
        const VIEW       = 1 << 1;
        /// Background and ground disc.
        const BACKGROUND = 1 << 2;
        /// Stage translation.
        const OFFSET     = 1 << 3;
    }
}

/// Start-up parameters of a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub preset: String,
    pub environment: String,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping: f32,
    /// Allowed polar deviation from the horizon, in radians.
    pub polar_band: f32,
    pub guide_speed: f32,
    pub guide_radius: f32,
    pub pan_step: f32,
    /// Stage translation in the screen plane.
    pub model_offset: Vec2,
    pub model_scale: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            preset: crate::presets::DEFAULT_PRESET.to_string(),
            environment: WHITE_ENVIRONMENT.to_string(),
            fov: 80.0,
            camera_position: Vec3::new(0.0, 50.0, 130.0),
            camera_target: Vec3::ZERO,
            min_distance: 20.0,
            max_distance: 300.0,
            damping: 0.1,
            polar_band: FRAC_PI_2,
            guide_speed: 1.4,
            guide_radius: 4.0,
            pan_step: keyboard::DEFAULT_PAN_STEP,
            model_offset: Vec2::new(0.0, -58.0),
            model_scale: 0.06,
        }
    }
}

pub struct StudioSession {
    scene: Scene,
    registry: MaterialRegistry,

    staged: ViewSettings,
    committed: ViewSettings,
    pending: PendingChanges,

    environments: EnvironmentSet,
    measurements: MeasurementTable,
    selected_measurement: Option<usize>,
    guide: GuideLine,

    orbit: OrbitControls,
    model: Option<LoadedModel>,
    samples: SampleShapes,

    stage: NodeKey,
    ground: NodeKey,
    ground_mesh: MeshKey,
    ambient: Option<LightKey>,

    offset: Vec2,
    pan_step: f32,
}

impl StudioSession {
    /// Builds the stage: camera, lights, ground disc and sample shapes. The
    /// model arrives later through [`install_model`](Self::install_model).
    pub fn new(
        settings: &SessionSettings,
        environments: EnvironmentSet,
        measurements: MeasurementTable,
    ) -> Result<Self> {
        let preset = find_preset(&settings.preset)?;
        if environments.get(&settings.environment).is_none() {
            log::warn!(
                "Environment '{}' is not loaded; env maps stay unbound",
                settings.environment
            );
        }

        let mut scene = Scene::new();
        scene.camera.fov = settings.fov;
        scene.camera.update_projection_matrix();
        let camera_node = scene.camera_node;
        if let Some(node) = scene.get_node_mut(camera_node) {
            node.transform.position = settings.camera_position;
            node.transform.look_at(settings.camera_target, Vec3::Y);
        }

        let mut orbit = OrbitControls::from_position(settings.camera_position, settings.camera_target);
        orbit.damping_factor = settings.damping;
        orbit.set_distance_limits(settings.min_distance, settings.max_distance);
        orbit.set_polar_band(settings.polar_band);

        let mut stage = Node::new("stage");
        stage.transform.position = settings.model_offset.extend(0.0);
        stage.transform.scale = Vec3::splat(settings.model_scale);
        let stage = scene.add_node(stage);

        let mut ambient = None;
        for rig in studio_lights() {
            let is_ambient = rig.light.kind == LightKind::Ambient;
            let node = scene.add_light_to_parent(rig.light, stage);
            if let Some(node) = scene.get_node_mut(node) {
                node.name = rig.name.to_string();
                node.transform.position = rig.position;
                if is_ambient {
                    ambient = node.light;
                }
            }
        }

        let ground_material = scene.add_material(Material::new_basic(GROUND_COLOR).with_name("ground"));
        let ground_mesh = scene.meshes.insert(
            Mesh::new(
                "ground",
                Arc::new(create_circle(GROUND_RADIUS, GROUND_SEGMENTS)),
                ground_material,
            )
            .with_role(MeshRole::Ground),
        );
        let mut ground = Node::new("ground");
        ground.mesh = Some(ground_mesh);
        ground.visible = false;
        ground.transform.set_rotation_euler(-FRAC_PI_2, 0.0, 0.0);
        ground.transform.scale = Vec3::splat(GROUND_SCALE);
        let ground = scene.add_to_parent(ground, stage);

        let mut registry = MaterialRegistry::new();
        let samples = SampleShapes::spawn(&mut scene, &mut registry, stage, preset.material());

        let mut staged = ViewSettings::default();
        staged.apply_preset(preset);
        staged.environment.clone_from(&settings.environment);

        log::info!(
            "Session ready: preset '{}', environment '{}', {} measurements",
            preset.name,
            settings.environment,
            measurements.len()
        );

        Ok(Self {
            scene,
            registry,
            committed: staged.clone(),
            staged,
            pending: PendingChanges::all(),
            environments,
            measurements,
            selected_measurement: None,
            guide: GuideLine::new(settings.guide_speed, settings.guide_radius),
            orbit,
            model: None,
            samples,
            stage,
            ground,
            ground_mesh,
            ambient,
            offset: settings.model_offset,
            pan_step: settings.pan_step,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[must_use]
    pub fn registry(&self) -> &MaterialRegistry {
        &self.registry
    }

    /// Settings in effect since the last commit.
    #[must_use]
    pub fn view(&self) -> &ViewSettings {
        &self.committed
    }

    /// Settings the next commit will apply.
    #[must_use]
    pub fn staged_view(&self) -> &ViewSettings {
        &self.staged
    }

    #[must_use]
    pub fn pending(&self) -> PendingChanges {
        self.pending
    }

    #[must_use]
    pub fn environments(&self) -> &EnvironmentSet {
        &self.environments
    }

    #[must_use]
    pub fn measurements(&self) -> &MeasurementTable {
        &self.measurements
    }

    #[must_use]
    pub fn selected_measurement(&self) -> Option<usize> {
        self.selected_measurement
    }

    #[must_use]
    pub fn guide(&self) -> &GuideLine {
        &self.guide
    }

    #[must_use]
    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitControls {
        &mut self.orbit
    }

    #[must_use]
    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn samples(&self) -> &SampleShapes {
        &self.samples
    }

    #[must_use]
    pub fn stage(&self) -> NodeKey {
        self.stage
    }

    #[must_use]
    pub fn ground(&self) -> NodeKey {
        self.ground
    }

    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    // ========================================================================
    // Material registry
    // ========================================================================

    /// Selects a mesh for editing.
    pub fn select_mesh(&mut self, mesh: MeshKey) -> Result<()> {
        self.registry.capture_current(&self.scene, mesh)
    }

    /// Sets a property by its UI name. Returns `false` when the edit was
    /// ignored (nothing selected yet, or the active family lacks it).
    pub fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<bool> {
        let key = PropertyKey::from_name(name)
            .ok_or_else(|| Error::InvalidData(format!("unknown property '{name}'")))?;
        self.set_property_key(key, value)
    }

    pub fn set_property_key(&mut self, key: PropertyKey, value: PropertyValue) -> Result<bool> {
        guarded("set_property", self.registry.set_property(&mut self.scene, key, value))
    }

    /// Slider input on the 0–100 scale.
    pub fn set_slider(&mut self, key: PropertyKey, raw: f32) -> Result<bool> {
        guarded("set_slider", self.registry.set_slider(&mut self.scene, key, raw))
    }

    pub fn switch_family(&mut self) -> Result<bool> {
        guarded(
            "switch_family",
            self.registry.switch_family(&mut self.scene).map(|_| ()),
        )
    }

    /// Returns `true` only when a material was rebuilt.
    pub fn activate(&mut self) -> Result<bool> {
        match self.registry.activate(&mut self.scene) {
            Ok(rebuilt) => Ok(rebuilt),
            Err(e) => guarded("activate", Err(e)),
        }
    }

    // ========================================================================
    // Staged view edits
    // ========================================================================

    /// Stages every field of the named preset. An unknown name changes
    /// nothing.
    pub fn apply_preset(&mut self, name: &str) -> Result<()> {
        let preset = find_preset(name)?;
        self.staged.apply_preset(preset);
        self.registry.clear_overrides();
        self.registry.set_family(preset.family);
        self.pending |= PendingChanges::RESTYLE | PendingChanges::VIEW;
        log::info!("Preset '{name}' staged");
        Ok(())
    }

    pub fn set_wireframe(&mut self, enabled: bool) {
        self.staged.wireframe = enabled;
        self.pending |= PendingChanges::VIEW;
    }

    pub fn set_wireframe_color(&mut self, color: Color) {
        self.staged.wireframe_color = color;
        self.pending |= PendingChanges::VIEW;
    }

    pub fn set_skin_visible(&mut self, visible: bool) {
        self.staged.skin_visible = visible;
        self.pending |= PendingChanges::VIEW;
    }

    pub fn set_env_map_enabled(&mut self, enabled: bool) {
        self.staged.env_map_enabled = enabled;
        self.pending |= PendingChanges::VIEW;
    }

    /// Sets or clears the colour texture of the model surface.
    pub fn set_map(&mut self, map: Option<TextureHandle>) {
        self.staged.map = map;
        self.pending |= PendingChanges::RESTYLE | PendingChanges::VIEW;
    }

    pub fn set_environment(&mut self, name: &str) -> Result<()> {
        if self.environments.get(name).is_none() {
            return Err(Error::InvalidData(format!("unknown environment '{name}'")));
        }
        name.clone_into(&mut self.staged.environment);
        self.pending |= PendingChanges::VIEW | PendingChanges::BACKGROUND;
        Ok(())
    }

    pub fn set_background(&mut self, enabled: bool) {
        self.staged.background = enabled;
        self.pending |= PendingChanges::BACKGROUND;
    }

    /// Returns the staged state.
    pub fn toggle_background(&mut self) -> bool {
        self.set_background(!self.staged.background);
        self.staged.background
    }

    pub fn set_model_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        self.pending |= PendingChanges::OFFSET;
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.set_model_offset(self.offset + delta);
    }

    /// Pans for this frame's key presses. Returns whether any key panned.
    pub fn handle_keys(&mut self, presses: &[Key]) -> bool {
        let delta = keyboard::accumulate(presses, self.pan_step);
        if delta == Vec2::ZERO {
            return false;
        }
        self.pan(delta);
        true
    }

    // ========================================================================
    // Immediate scene edits
    // ========================================================================

    /// Shows the measurement at `index`, or hides it when it is already
    /// shown. Returns the selection afterwards.
    pub fn select_measurement(&mut self, index: usize) -> Result<Option<usize>> {
        if self.selected_measurement == Some(index) {
            self.clear_measurement();
            return Ok(None);
        }
        let path = self
            .measurements
            .get(index)
            .ok_or_else(|| Error::InvalidData(format!("no measurement at index {index}")))?;
        self.guide.show(&mut self.scene, self.stage, path);
        self.selected_measurement = Some(index);
        Ok(self.selected_measurement)
    }

    pub fn clear_measurement(&mut self) {
        self.guide.hide(&mut self.scene);
        self.selected_measurement = None;
    }

    pub fn set_ambient(&mut self, color: Color, intensity: f32) {
        if let Some(light) = self.ambient.and_then(|k| self.scene.lights.get_mut(k)) {
            light.color = color;
            light.intensity = intensity.max(0.0);
        }
    }

    /// Replaces the model on stage. The old model's meshes leave the
    /// registry before they leave the scene.
    pub fn install_model(&mut self, asset: &ModelAsset) {
        if let Some(old) = self.model.take() {
            for &mesh in &old.meshes {
                self.registry.release(mesh);
            }
            old.despawn(&mut self.scene);
        }
        let model = LoadedModel::spawn(&mut self.scene, self.stage, asset, self.staged.preset);
        for &mesh in &model.meshes {
            self.registry.register_sync_target(mesh);
        }
        log::info!("Installed '{}' ({} meshes)", model.source, model.meshes.len());
        self.model = Some(model);
        self.pending |= PendingChanges::RESTYLE | PendingChanges::VIEW;
    }

    /// Runs one queued command.
    pub fn apply(&mut self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::SelectMesh(mesh) => self.select_mesh(mesh)?,
            SessionCommand::SetProperty { key, value } => {
                self.set_property_key(key, value)?;
            }
            SessionCommand::SetSlider { key, raw } => {
                self.set_slider(key, raw)?;
            }
            SessionCommand::SwitchFamily => {
                self.switch_family()?;
            }
            SessionCommand::Activate => {
                self.activate()?;
            }
            SessionCommand::ApplyPreset(name) => self.apply_preset(&name)?,
            SessionCommand::SelectMeasurement(index) => {
                self.select_measurement(index)?;
            }
            SessionCommand::ClearMeasurement => self.clear_measurement(),
            SessionCommand::SetBackground(enabled) => self.set_background(enabled),
            SessionCommand::ToggleBackground => {
                self.toggle_background();
            }
            SessionCommand::SetEnvironment(name) => self.set_environment(&name)?,
            SessionCommand::SetWireframe(enabled) => self.set_wireframe(enabled),
            SessionCommand::SetWireframeColor(color) => self.set_wireframe_color(color),
            SessionCommand::SetSkinVisible(visible) => self.set_skin_visible(visible),
            SessionCommand::SetEnvMapEnabled(enabled) => self.set_env_map_enabled(enabled),
            SessionCommand::SetMap(map) => self.set_map(map),
            SessionCommand::SetModelOffset(offset) => self.set_model_offset(offset),
            SessionCommand::Pan(delta) => self.pan(delta),
            SessionCommand::SetAmbient { color, intensity } => self.set_ambient(color, intensity),
            SessionCommand::InstallModel(asset) => self.install_model(&asset),
            SessionCommand::InstallLoadedModel { model, ticket } => {
                if ticket.is_current() {
                    self.install_model(&model);
                } else {
                    log::warn!(
                        "Dropping '{}': superseded by a newer model request",
                        model.source
                    );
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Frame steps
    // ========================================================================

    /// Applies every staged change at once. Returns what was applied.
    pub fn commit(&mut self) -> Result<PendingChanges> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(pending);
        }
        self.committed = self.staged.clone();
        let cubes = self.environments.get(&self.committed.environment);

        if let Some(model) = self.model.as_mut() {
            if pending.contains(PendingChanges::RESTYLE) {
                model.restyle(&mut self.scene, self.committed.preset, self.committed.map);
            }
            if pending.intersects(PendingChanges::RESTYLE | PendingChanges::VIEW) {
                model.apply_view(&mut self.scene, &mut self.registry, &self.committed, cubes)?;
                self.registry.activate(&mut self.scene)?;
            }
        }
        if pending.contains(PendingChanges::BACKGROUND) {
            self.commit_background(cubes);
        }
        if pending.contains(PendingChanges::OFFSET)
            && let Some(stage) = self.scene.get_node_mut(self.stage)
        {
            stage.transform.position = self.offset.extend(0.0);
        }
        log::debug!("Committed {pending:?}");
        Ok(pending)
    }

    fn commit_background(&mut self, cubes: Option<EnvironmentCubes>) {
        let cubes = if self.committed.background { cubes } else { None };
        if self.committed.background && cubes.is_none() {
            log::warn!(
                "Background requested but environment '{}' is not loaded",
                self.committed.environment
            );
        }

        self.scene.background = match cubes {
            Some(c) => BackgroundMode::Cube(c.reflection),
            None => BackgroundMode::Color(Color::WHITE),
        };
        if let Some(ground) = self.scene.get_node_mut(self.ground) {
            ground.visible = cubes.is_some();
        }
        let material = self.scene.meshes.get(self.ground_mesh).map(|m| m.material);
        if let Some(material) = material.and_then(|k| self.scene.material_mut(k)) {
            material.set_env_map(cubes.map(|c| c.refraction));
        }
    }

    /// Advances the measurement guide animation by one frame.
    pub fn advance_guide(&mut self) {
        self.guide.advance(&mut self.scene);
    }

    /// Feeds this frame's pointer input to the orbit camera.
    pub fn update_camera(&mut self, input: &Input, dt: f32) {
        let size = input.screen_size();
        if size.x > 0.0 && size.y > 0.0 {
            let aspect = size.x / size.y;
            if (aspect - self.scene.camera.aspect).abs() > f32::EPSILON {
                self.scene.camera.set_aspect(size.x, size.y);
            }
        }
        let camera_node = self.scene.camera_node;
        if let Some(node) = self.scene.get_node_mut(camera_node) {
            self.orbit.update(&mut node.transform, input, dt);
        }
    }
}

/// Turns the registry's guarded errors into a logged `Ok(false)`.
fn guarded(op: &str, result: Result<()>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e @ Error::NotReady(_)) => {
            log::warn!("{op} ignored: {e}");
            Ok(false)
        }
        Err(e @ Error::UnsupportedProperty { .. }) => {
            log::debug!("{op} ignored: {e}");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use couture_scene::MeasurementPath;

    use super::*;

    fn session() -> StudioSession {
        let table = MeasurementTable::new(vec![
            MeasurementPath::new("waist", vec![Vec3::ZERO, Vec3::X, Vec3::Y], true),
            MeasurementPath::new("arm", vec![Vec3::ZERO, Vec3::Z], false),
        ]);
        StudioSession::new(&SessionSettings::default(), EnvironmentSet::new(), table).unwrap()
    }

    #[test]
    fn edits_before_a_model_are_ignored() {
        let mut session = session();
        assert!(!session.set_property("color", Color::BLACK.into()).unwrap());
        assert!(!session.switch_family().unwrap());
        assert!(session.set_property("sheen", Color::BLACK.into()).is_err());
    }

    #[test]
    fn selecting_the_same_measurement_twice_hides_it() {
        let mut session = session();
        assert_eq!(session.select_measurement(1).unwrap(), Some(1));
        assert!(session.guide().is_visible());
        assert_eq!(session.select_measurement(1).unwrap(), None);
        assert!(!session.guide().is_visible());
        assert!(session.select_measurement(9).is_err());
    }

    #[test]
    fn offsets_wait_for_commit() {
        let mut session = session();
        session.commit().unwrap();
        session.pan(Vec2::new(4.0, 0.0));
        let stage = session.stage();
        assert_eq!(
            session.scene().get_node(stage).unwrap().transform.position,
            Vec3::new(0.0, -58.0, 0.0)
        );
        assert_eq!(session.commit().unwrap(), PendingChanges::OFFSET);
        assert_eq!(
            session.scene().get_node(stage).unwrap().transform.position,
            Vec3::new(4.0, -58.0, 0.0)
        );
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let mut session = session();
        session.commit().unwrap();
        assert!(session.set_environment("moon").is_err());
        assert!(session.pending().is_empty());
    }
}
