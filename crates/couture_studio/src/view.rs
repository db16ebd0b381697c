//! View settings and the passes that push them onto the loaded model.

use std::sync::Arc;

use couture_assets::{EnvironmentCubes, WHITE_ENVIRONMENT};
use couture_core::{Color, MeshKey, NodeKey, Result, TextureHandle};
use couture_resources::{DEFAULT_EDGE_THRESHOLD_DEG, Geometry, Material, PropertyKey, PropertyValue};
use couture_scene::{Mesh, MeshRole, Scene};
use rustc_hash::FxHashMap;

use crate::presets::{DEFAULT_PRESET, EnvMapping, PRESETS, StylePreset, find_preset};
use crate::registry::MaterialRegistry;

/// Toggles and choices driven by the UI and by presets.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub preset: &'static StylePreset,
    pub wireframe: bool,
    pub wireframe_color: Color,
    pub skin_visible: bool,
    pub env_map_enabled: bool,
    pub environment: String,
    pub background: bool,
    /// Optional colour texture for the model surface.
    pub map: Option<TextureHandle>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        let preset = find_preset(DEFAULT_PRESET).unwrap_or(&PRESETS[0]);
        let mut settings = Self {
            preset,
            wireframe: false,
            wireframe_color: Color::BLACK,
            skin_visible: true,
            env_map_enabled: false,
            environment: WHITE_ENVIRONMENT.to_string(),
            background: false,
            map: None,
        };
        settings.apply_preset(preset);
        settings
    }
}

impl ViewSettings {
    /// Copies every field the preset defines. Fields the preset leaves
    /// untouched keep their value.
    pub fn apply_preset(&mut self, preset: &'static StylePreset) {
        self.preset = preset;
        self.wireframe = preset.wireframe_enabled;
        if let Some(color) = preset.wireframe_color {
            self.wireframe_color = color;
        }
        self.skin_visible = preset.skin_visible;
        if let Some(enabled) = preset.env_map_enabled {
            self.env_map_enabled = enabled;
        }
    }

    /// The env map the model should carry: `Some(None)` to unbind,
    /// `None` to leave the current binding.
    #[must_use]
    pub fn model_env_map(&self, cubes: Option<EnvironmentCubes>) -> Option<Option<TextureHandle>> {
        let handle = match self.preset.env_mapping {
            EnvMapping::Untouched => return None,
            EnvMapping::Reflection => cubes.map(|c| c.reflection),
            EnvMapping::Refraction => cubes.map(|c| c.refraction),
        };
        Some(if self.env_map_enabled { handle } else { None })
    }
}

/// The model currently on stage.
#[derive(Debug)]
pub struct LoadedModel {
    pub source: String,
    pub root: NodeKey,
    pub meshes: Vec<MeshKey>,
    edges: FxHashMap<MeshKey, Arc<Geometry>>,
}

impl LoadedModel {
    /// Adds every part under a fresh group node below `parent`.
    pub fn spawn(
        scene: &mut Scene,
        parent: NodeKey,
        asset: &couture_assets::ModelAsset,
        preset: &StylePreset,
    ) -> Self {
        let root = scene.add_to_parent(couture_scene::Node::new(&asset.source), parent);
        let mut meshes = Vec::with_capacity(asset.parts.len());
        for part in &asset.parts {
            let material = scene.add_material(preset.material());
            let node = scene.add_mesh_to_parent(
                Mesh::new(&part.name, part.geometry.clone(), material),
                root,
            );
            if let Some(mesh) = scene.get_node(node).and_then(|n| n.mesh) {
                meshes.push(mesh);
            }
        }
        Self {
            source: asset.source.clone(),
            root,
            meshes,
            edges: FxHashMap::default(),
        }
    }

    /// Removes the model and everything attached below it.
    pub fn despawn(self, scene: &mut Scene) {
        scene.remove_node(self.root);
        scene.prune_unreferenced_materials();
    }

    /// Gives every mesh a fresh copy of the preset material, keeping the
    /// texture map.
    pub fn restyle(&self, scene: &mut Scene, preset: &StylePreset, map: Option<TextureHandle>) {
        for &mesh in &self.meshes {
            let mut material = preset.material();
            material.set_map(map);
            let key = scene.add_material(material);
            scene.assign_material(key, &[mesh]);
        }
        scene.prune_unreferenced_materials();
    }

    /// Attaches edge lines under every mesh node, replacing existing ones.
    pub fn put_wireframe(&mut self, scene: &mut Scene, color: Color) {
        self.remove_wireframe(scene);
        let material = scene.add_material(Material::new_line(color).with_name("wireframe"));
        for &mesh in &self.meshes {
            let Some(node) = scene.mesh_node(mesh) else {
                continue;
            };
            let Some(source) = scene.meshes.get(mesh).map(|m| m.geometry.clone()) else {
                continue;
            };
            let edges = self
                .edges
                .entry(mesh)
                .or_insert_with(|| Arc::new(source.edges(DEFAULT_EDGE_THRESHOLD_DEG)))
                .clone();
            scene.add_mesh_to_parent(
                Mesh::new("wireframe", edges, material).with_role(MeshRole::WireframeOverlay),
                node,
            );
        }
    }

    /// Detaches every edge-line child. Returns how many were removed.
    pub fn remove_wireframe(&self, scene: &mut Scene) -> usize {
        let overlays: Vec<NodeKey> = scene
            .descendants(self.root)
            .into_iter()
            .filter(|&k| {
                scene
                    .get_node(k)
                    .and_then(|n| n.mesh)
                    .and_then(|m| scene.meshes.get(m))
                    .is_some_and(|m| m.role == MeshRole::WireframeOverlay)
            })
            .collect();
        for &node in &overlays {
            scene.remove_node(node);
        }
        if !overlays.is_empty() {
            scene.prune_unreferenced_materials();
        }
        overlays.len()
    }

    /// Whether the node of `mesh` has an edge-line child.
    #[must_use]
    pub fn has_wireframe(&self, scene: &Scene, mesh: MeshKey) -> bool {
        let Some(node) = scene.mesh_node(mesh).and_then(|n| scene.get_node(n)) else {
            return false;
        };
        node.children().iter().any(|&c| {
            scene
                .get_node(c)
                .and_then(|n| n.mesh)
                .and_then(|m| scene.meshes.get(m))
                .is_some_and(|m| m.role == MeshRole::WireframeOverlay)
        })
    }

    /// Applies the view settings to the model and captures its meshes.
    ///
    /// Order: edge overlay (only while the skin is shown), skin switch
    /// (`material.wireframe = !skin`), env-map binding, then capture of each
    /// mesh so the last one ends up selected.
    pub fn apply_view(
        &mut self,
        scene: &mut Scene,
        registry: &mut MaterialRegistry,
        settings: &ViewSettings,
        cubes: Option<EnvironmentCubes>,
    ) -> Result<()> {
        if settings.wireframe && settings.skin_visible {
            self.put_wireframe(scene, settings.wireframe_color);
        } else {
            self.remove_wireframe(scene);
        }

        let env = settings.model_env_map(cubes);
        for &mesh in &self.meshes {
            let Some(key) = scene.meshes.get(mesh).map(|m| m.material) else {
                continue;
            };
            if let Some(material) = scene.material_mut(key) {
                // Families all carry a wireframe flag; line/basic kinds are
                // not used for model meshes.
                if let Err(e) =
                    material.set(PropertyKey::Wireframe, PropertyValue::Bool(!settings.skin_visible))
                {
                    log::debug!("skin switch skipped: {e}");
                }
                if let Some(env) = env {
                    material.set_env_map(env);
                }
            }
        }
        registry.forget_override(PropertyKey::Wireframe);
        if env.is_some() {
            registry.forget_override(PropertyKey::EnvMap);
        }

        for &mesh in &self.meshes {
            registry.capture_current(scene, mesh)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_leave_untouched_fields_alone() {
        let mut settings = ViewSettings::default();
        settings.env_map_enabled = true;
        settings.wireframe_color = Color::from_hex(0x123456);

        settings.apply_preset(find_preset("BlueWithPurpleEffect").unwrap());
        assert!(settings.env_map_enabled);
        assert_eq!(settings.wireframe_color, Color::from_hex(0x123456));

        settings.apply_preset(find_preset("BlueWithLightEffect").unwrap());
        assert!(!settings.env_map_enabled);
        assert_eq!(settings.wireframe_color, Color::WHITE);
    }

    #[test]
    fn untouched_mapping_keeps_binding() {
        let mut settings = ViewSettings::default();
        settings.apply_preset(find_preset("BlueWithPurpleEffect").unwrap());
        assert_eq!(settings.model_env_map(None), None);

        settings.apply_preset(find_preset("OriginSkin").unwrap());
        assert_eq!(settings.model_env_map(None), Some(None));
    }
}
