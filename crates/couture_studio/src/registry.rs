//! The material registry ("mesh store").
//!
//! One selected mesh, a snapshot of the material it had when captured, the
//! active material family and the last value written for each property.
//! Family switches and reconstructive edits build one new material and bind
//! it to the selected mesh and every registered sync target inside a single
//! `&mut Scene` call, so a frame never sees targets disagree.

use couture_core::{Error, MaterialKey, MeshKey, Result, TextureHandle};
use couture_resources::{
    Material, MaterialFamily, PropertyKey, PropertyKind, PropertyMap, PropertyValue, UpdateMode,
};
use couture_scene::Scene;
use rustc_hash::FxHashSet;

#[derive(Debug, Default)]
pub struct MaterialRegistry {
    /// Lookup only: the scene owns the mesh.
    selected: Option<MeshKey>,
    snapshot: Option<Material>,
    reference_env_map: Option<TextureHandle>,

    active_family: MaterialFamily,
    overrides: PropertyMap,
    synced: bool,

    targets: Vec<MeshKey>,
    reconstructions: u64,
}

impl MaterialRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn selected(&self) -> Option<MeshKey> {
        self.selected
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&Material> {
        self.snapshot.as_ref()
    }

    /// Environment map the selected mesh carried when captured.
    #[must_use]
    pub fn reference_env_map(&self) -> Option<TextureHandle> {
        self.reference_env_map
    }

    #[must_use]
    pub fn active_family(&self) -> MaterialFamily {
        self.active_family
    }

    #[must_use]
    pub fn overrides(&self) -> &PropertyMap {
        &self.overrides
    }

    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    #[must_use]
    pub fn sync_targets(&self) -> &[MeshKey] {
        &self.targets
    }

    /// Number of materials built by broadcasts so far.
    #[must_use]
    pub fn reconstruction_count(&self) -> u64 {
        self.reconstructions
    }

    // ========================================================================
    // Sync targets
    // ========================================================================

    /// Adds a mesh that receives every broadcast. Returns `false` if it was
    /// already registered.
    pub fn register_sync_target(&mut self, mesh: MeshKey) -> bool {
        if self.targets.contains(&mesh) {
            return false;
        }
        self.targets.push(mesh);
        true
    }

    pub fn unregister_sync_target(&mut self, mesh: MeshKey) -> bool {
        let before = self.targets.len();
        self.targets.retain(|&t| t != mesh);
        before != self.targets.len()
    }

    /// Forgets a mesh entirely: unregisters it and drops the selection if it
    /// was the selected one. Called before the mesh leaves the scene.
    pub fn release(&mut self, mesh: MeshKey) {
        self.unregister_sync_target(mesh);
        if self.selected == Some(mesh) {
            self.selected = None;
            self.snapshot = None;
            self.reference_env_map = None;
            self.synced = false;
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Selects `mesh` and snapshots its current material.
    ///
    /// Replaces any previous selection. The active family follows the
    /// captured material when it belongs to one.
    pub fn capture_current(&mut self, scene: &Scene, mesh: MeshKey) -> Result<()> {
        let material = scene
            .mesh_material(mesh)
            .ok_or_else(|| Error::InvalidData("capture_current: mesh has no material".into()))?;

        let snapshot = material.clone();
        if let Some(family) = snapshot.family() {
            self.active_family = family;
        }
        self.reference_env_map = snapshot.env_map();
        self.snapshot = Some(snapshot);
        self.selected = Some(mesh);
        self.synced = false;
        log::debug!("Captured mesh {mesh:?} ({})", self.active_family);
        Ok(())
    }

    /// Writes one property.
    ///
    /// In-place properties change the selected mesh's live material (and so
    /// every target already sharing it). Reconstructive ones build a new
    /// material from the live one plus the new value and broadcast it.
    /// Either way the value is recorded as an override.
    pub fn set_property(&mut self, scene: &mut Scene, key: PropertyKey, value: PropertyValue) -> Result<()> {
        let selected = self.require_selected(scene, "set_property")?;
        if !self.active_family.supports(key) {
            return Err(Error::UnsupportedProperty {
                property: key.name(),
                family: self.active_family.name(),
            });
        }
        let value = normalize_value(key, value)?;

        match key.update_mode() {
            UpdateMode::InPlace => {
                let material_key = scene
                    .meshes
                    .get(selected)
                    .map(|m| m.material)
                    .ok_or(Error::NotReady("set_property"))?;
                let family = scene
                    .material(material_key)
                    .ok_or(Error::NotReady("set_property"))?
                    .family();
                if family == Some(self.active_family) {
                    scene
                        .material_mut(material_key)
                        .ok_or(Error::NotReady("set_property"))?
                        .set(key, value)?;
                } else {
                    // The live material is from another family; bring every
                    // target onto the active one first.
                    let mut props = self.live_properties(scene, selected);
                    props.insert(key, value);
                    let material = self.build(&props, scene, selected);
                    self.broadcast(scene, selected, material);
                }
            }
            UpdateMode::Reconstruct => {
                let mut props = self.live_properties(scene, selected);
                props.insert(key, value);
                let material = self.build(&props, scene, selected);
                self.broadcast(scene, selected, material);
            }
        }

        self.overrides.insert(key, value);
        self.synced = false;
        log::debug!("set {key} = {value:?}");
        Ok(())
    }

    /// Slider entry point: rescales a raw 0–100 reading first.
    pub fn set_slider(&mut self, scene: &mut Scene, key: PropertyKey, raw: f32) -> Result<()> {
        let Some(value) = key.scale_slider(raw) else {
            return Err(Error::PropertyType {
                property: key.name(),
                expected: "number",
            });
        };
        self.set_property(scene, key, PropertyValue::Scalar(value))
    }

    /// Toggles the family and broadcasts the rebuilt material.
    pub fn switch_family(&mut self, scene: &mut Scene) -> Result<MaterialKey> {
        let selected = self.require_selected(scene, "switch_family")?;
        self.active_family = self.active_family.toggled();
        let material = self.rebuild(scene, selected);
        let key = self.broadcast(scene, selected, material);
        self.synced = true;
        log::debug!("Switched to {}", self.active_family);
        Ok(key)
    }

    /// Chooses the family for the next [`activate`](Self::activate).
    pub fn set_family(&mut self, family: MaterialFamily) {
        if family != self.active_family {
            self.active_family = family;
            self.synced = false;
        }
    }

    /// Rebuilds and broadcasts unless nothing changed since the last
    /// broadcast. Returns whether a material was built.
    pub fn activate(&mut self, scene: &mut Scene) -> Result<bool> {
        let selected = self.require_selected(scene, "activate")?;
        if self.synced {
            return Ok(false);
        }
        let material = self.rebuild(scene, selected);
        self.broadcast(scene, selected, material);
        self.synced = true;
        Ok(true)
    }

    /// Drops one override, e.g. when a view toggle rewrites that property.
    pub fn forget_override(&mut self, key: PropertyKey) {
        if self.overrides.remove(&key).is_some() {
            self.synced = false;
        }
    }

    /// Forgets overrides; the next activation starts from the snapshot.
    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
        self.synced = false;
    }

    /// Drops selection, snapshot, overrides and targets.
    pub fn reset(&mut self) {
        *self = Self {
            reconstructions: self.reconstructions,
            ..Self::default()
        };
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require_selected(&self, scene: &Scene, op: &'static str) -> Result<MeshKey> {
        match self.selected {
            Some(mesh) if scene.meshes.contains_key(mesh) => Ok(mesh),
            _ => Err(Error::NotReady(op)),
        }
    }

    fn live_properties(&self, scene: &Scene, selected: MeshKey) -> PropertyMap {
        scene
            .mesh_material(selected)
            .map(|m| self.active_family.project(&m.properties()))
            .unwrap_or_default()
    }

    /// Snapshot properties the active family supports, family defaults for
    /// whatever the snapshot lacks, then the recorded overrides.
    fn rebuild(&self, scene: &Scene, selected: MeshKey) -> Material {
        let family = self.active_family;
        let mut props = self
            .snapshot
            .as_ref()
            .map(|s| family.project(&s.properties()))
            .unwrap_or_default();
        for (key, value) in family.switch_defaults() {
            props.entry(*key).or_insert(*value);
        }
        for (key, value) in family.project(&self.overrides) {
            props.insert(key, value);
        }
        self.build(&props, scene, selected)
    }

    fn build(&self, props: &PropertyMap, scene: &Scene, selected: MeshKey) -> Material {
        let mut material = Material::from_properties(self.active_family, props)
            .with_name(&format!("{} (registry)", self.active_family));
        // Texture maps are not part of the schema; carry the live one over.
        let map = scene
            .mesh_material(selected)
            .and_then(Material::map)
            .or_else(|| self.snapshot.as_ref().and_then(Material::map));
        material.set_map(map);
        if let Some(live) = scene.mesh_material(selected) {
            material.settings = live.settings;
        }
        material
    }

    /// Binds `material` to the selection and all live targets in one step and
    /// frees the materials nothing uses any more.
    fn broadcast(&mut self, scene: &mut Scene, selected: MeshKey, material: Material) -> MaterialKey {
        self.targets.retain(|t| scene.meshes.contains_key(*t));

        let mut recipients = Vec::with_capacity(self.targets.len() + 1);
        recipients.push(selected);
        recipients.extend(self.targets.iter().copied().filter(|&t| t != selected));

        let previous: FxHashSet<MaterialKey> = recipients
            .iter()
            .filter_map(|m| scene.meshes.get(*m).map(|mesh| mesh.material))
            .collect();

        let key = scene.add_material(material);
        scene.assign_material(key, &recipients);
        self.reconstructions += 1;

        let still_used: FxHashSet<MaterialKey> = scene.meshes.values().map(|m| m.material).collect();
        for stale in previous.difference(&still_used) {
            scene.materials.remove(*stale);
        }
        log::debug!(
            "Broadcast {} material to {} meshes",
            self.active_family,
            recipients.len()
        );
        key
    }
}

/// Checks the value shape and clamps scalars to the schema range.
fn normalize_value(key: PropertyKey, value: PropertyValue) -> Result<PropertyValue> {
    let kind = key.kind();
    if !value.matches(kind) {
        return Err(Error::PropertyType {
            property: key.name(),
            expected: match kind {
                PropertyKind::Color => "color",
                PropertyKind::Toggle => "boolean",
                PropertyKind::Scalar { .. } => "number",
                PropertyKind::Texture => "texture",
            },
        });
    }
    Ok(match (value, kind) {
        (PropertyValue::Scalar(v), PropertyKind::Scalar { min, max, .. }) => {
            PropertyValue::Scalar(v.clamp(min, max))
        }
        _ => value,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use couture_core::Color;
    use couture_resources::primitives::create_box;
    use couture_scene::Mesh;

    use super::*;

    fn scene_with_meshes(n: usize) -> (Scene, Vec<MeshKey>) {
        let mut scene = Scene::new();
        let geometry = Arc::new(create_box(1.0, 1.0, 1.0));
        let mut keys = Vec::new();
        for i in 0..n {
            let material = scene.add_material(Material::new_physical(Color::WHITE));
            let node = scene.add_mesh(Mesh::new(&format!("m{i}"), geometry.clone(), material));
            keys.push(scene.get_node(node).unwrap().mesh.unwrap());
        }
        (scene, keys)
    }

    #[test]
    fn operations_before_capture_are_not_ready() {
        let (mut scene, _) = scene_with_meshes(1);
        let mut registry = MaterialRegistry::new();
        assert!(matches!(registry.activate(&mut scene), Err(Error::NotReady("activate"))));
        assert!(matches!(
            registry.switch_family(&mut scene),
            Err(Error::NotReady("switch_family"))
        ));
        assert!(matches!(
            registry.set_property(&mut scene, PropertyKey::Color, Color::BLACK.into()),
            Err(Error::NotReady("set_property"))
        ));
    }

    #[test]
    fn unsupported_properties_are_not_recorded() {
        let (mut scene, keys) = scene_with_meshes(1);
        let mut registry = MaterialRegistry::new();
        registry.capture_current(&scene, keys[0]).unwrap();
        let err = registry
            .set_property(&mut scene, PropertyKey::Shininess, PropertyValue::Scalar(10.0))
            .unwrap_err();
        assert!(err.is_guarded());
        assert!(registry.overrides().is_empty());
    }

    #[test]
    fn stale_materials_are_freed_after_broadcast() {
        let (mut scene, keys) = scene_with_meshes(3);
        let mut registry = MaterialRegistry::new();
        registry.register_sync_target(keys[1]);
        registry.register_sync_target(keys[2]);
        registry.capture_current(&scene, keys[0]).unwrap();

        let shared = registry.switch_family(&mut scene).unwrap();
        assert_eq!(scene.materials.len(), 1);
        for k in &keys {
            assert_eq!(scene.meshes[*k].material, shared);
        }
    }

    #[test]
    fn released_selection_is_not_ready() {
        let (mut scene, keys) = scene_with_meshes(1);
        let mut registry = MaterialRegistry::new();
        registry.capture_current(&scene, keys[0]).unwrap();
        registry.release(keys[0]);
        assert!(registry.selected().is_none());
        assert!(matches!(registry.activate(&mut scene), Err(Error::NotReady(_))));
    }
}
