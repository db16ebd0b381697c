//! Material Registry Tests
//!
//! Tests for:
//! - Capture: selection, snapshot, family adoption
//! - Property writes: in-place vs reconstructive, slider scaling, clamping
//! - Family switching with override replay
//! - Broadcast: every sync target shares one material
//! - Activation idempotence and guarded errors

use std::sync::Arc;

use couture::base::{Color, Error, MeshKey};
use couture::resources::primitives::create_box;
use couture::resources::{Material, MaterialFamily, PropertyKey, PropertyValue};
use couture::scene::{Mesh, Scene};
use couture::studio::MaterialRegistry;

/// A scene with `n` box meshes, each owning its own physical material.
fn scene_with(n: usize) -> (Scene, Vec<MeshKey>) {
    let mut scene = Scene::new();
    let geometry = Arc::new(create_box(1.0, 1.0, 1.0));
    let mut meshes = Vec::with_capacity(n);
    for i in 0..n {
        let material = scene.add_material(Material::new_physical(Color::WHITE));
        let node = scene.add_mesh(Mesh::new(&format!("part{i}"), geometry.clone(), material));
        meshes.push(scene.get_node(node).unwrap().mesh.unwrap());
    }
    (scene, meshes)
}

fn scalar(scene: &Scene, mesh: MeshKey, key: PropertyKey) -> f32 {
    scene
        .mesh_material(mesh)
        .and_then(|m| m.get(key))
        .and_then(|v| v.as_scalar())
        .unwrap()
}

fn registry_over(meshes: &[MeshKey]) -> MaterialRegistry {
    let mut registry = MaterialRegistry::new();
    for &mesh in meshes {
        registry.register_sync_target(mesh);
    }
    registry
}

// ============================================================================
// Capture
// ============================================================================

#[test]
fn capture_selects_and_snapshots() {
    let (scene, meshes) = scene_with(2);
    let mut registry = MaterialRegistry::new();
    registry.capture_current(&scene, meshes[1]).unwrap();

    assert_eq!(registry.selected(), Some(meshes[1]));
    assert_eq!(registry.active_family(), MaterialFamily::Physical);
    assert!(registry.snapshot().is_some());
    assert!(!registry.is_synced());
}

#[test]
fn capture_adopts_the_family_of_the_material() {
    let (mut scene, meshes) = scene_with(1);
    let phong = scene.add_material(Material::new_phong(Color::WHITE));
    scene.assign_material(phong, &meshes);

    let mut registry = MaterialRegistry::new();
    registry.capture_current(&scene, meshes[0]).unwrap();
    assert_eq!(registry.active_family(), MaterialFamily::Phong);
}

#[test]
fn targets_register_once() {
    let (_, meshes) = scene_with(1);
    let mut registry = MaterialRegistry::new();
    assert!(registry.register_sync_target(meshes[0]));
    assert!(!registry.register_sync_target(meshes[0]));
    assert_eq!(registry.sync_targets().len(), 1);
    assert!(registry.unregister_sync_target(meshes[0]));
    assert!(registry.sync_targets().is_empty());
}

// ============================================================================
// Property writes
// ============================================================================

#[test]
fn slider_fifty_sets_roughness_to_half() {
    let (mut scene, meshes) = scene_with(1);
    let mut registry = MaterialRegistry::new();
    registry.capture_current(&scene, meshes[0]).unwrap();

    registry.set_slider(&mut scene, PropertyKey::Roughness, 50.0).unwrap();
    assert!((scalar(&scene, meshes[0], PropertyKey::Roughness) - 0.5).abs() < 1e-6);
    assert_eq!(
        registry.overrides().get(&PropertyKey::Roughness),
        Some(&PropertyValue::Scalar(0.5))
    );
}

#[test]
fn out_of_range_scalars_are_clamped() {
    let (mut scene, meshes) = scene_with(1);
    let mut registry = MaterialRegistry::new();
    registry.capture_current(&scene, meshes[0]).unwrap();

    registry
        .set_property(&mut scene, PropertyKey::Metalness, PropertyValue::Scalar(3.0))
        .unwrap();
    assert!((scalar(&scene, meshes[0], PropertyKey::Metalness) - 1.0).abs() < 1e-6);
}

#[test]
fn mistyped_values_are_rejected() {
    let (mut scene, meshes) = scene_with(1);
    let mut registry = MaterialRegistry::new();
    registry.capture_current(&scene, meshes[0]).unwrap();

    let err = registry
        .set_property(&mut scene, PropertyKey::Color, PropertyValue::Scalar(1.0))
        .unwrap_err();
    assert!(matches!(err, Error::PropertyType { property: "color", .. }));
    assert!(!err.is_guarded());
    assert!(registry.overrides().is_empty());

    assert!(registry.set_slider(&mut scene, PropertyKey::Wireframe, 10.0).is_err());
}

#[test]
fn in_place_edits_keep_the_material() {
    let (mut scene, meshes) = scene_with(2);
    let mut registry = registry_over(&meshes);
    registry.capture_current(&scene, meshes[0]).unwrap();
    let shared = registry.switch_family(&mut scene).unwrap();
    registry.switch_family(&mut scene).unwrap();
    let shared_again = scene.meshes[meshes[0]].material;
    assert_ne!(shared, shared_again);

    let before = registry.reconstruction_count();
    registry
        .set_property(&mut scene, PropertyKey::Color, Color::from_hex(0x336699).into())
        .unwrap();
    assert_eq!(registry.reconstruction_count(), before);
    assert_eq!(scene.meshes[meshes[0]].material, shared_again);
    // The targets share the edited material, so they see the change too.
    assert_eq!(
        scene.mesh_material(meshes[1]).and_then(|m| m.get(PropertyKey::Color)),
        Some(PropertyValue::Color(Color::from_hex(0x336699)))
    );
}

#[test]
fn flat_shading_rebuilds_and_broadcasts() {
    let (mut scene, meshes) = scene_with(3);
    let mut registry = registry_over(&meshes);
    registry.capture_current(&scene, meshes[0]).unwrap();

    registry
        .set_property(&mut scene, PropertyKey::FlatShading, PropertyValue::Bool(true))
        .unwrap();
    assert_eq!(registry.reconstruction_count(), 1);

    let shared = scene.meshes[meshes[0]].material;
    for &mesh in &meshes {
        assert_eq!(scene.meshes[mesh].material, shared);
        assert_eq!(
            scene.mesh_material(mesh).and_then(|m| m.get(PropertyKey::FlatShading)),
            Some(PropertyValue::Bool(true))
        );
    }
    assert_eq!(scene.materials.len(), 1);
}

// ============================================================================
// Family switching
// ============================================================================

#[test]
fn overrides_survive_a_round_trip_through_phong() {
    let (mut scene, meshes) = scene_with(2);
    let mut registry = registry_over(&meshes);
    registry.capture_current(&scene, meshes[0]).unwrap();

    registry
        .set_property(&mut scene, PropertyKey::Metalness, PropertyValue::Scalar(0.5))
        .unwrap();
    registry
        .set_property(&mut scene, PropertyKey::Roughness, PropertyValue::Scalar(0.2))
        .unwrap();
    registry
        .set_property(&mut scene, PropertyKey::Color, Color::from_hex(0x0033_6699).into())
        .unwrap();
    registry.set_slider(&mut scene, PropertyKey::Reflectivity, 40.0).unwrap();

    registry.switch_family(&mut scene).unwrap();
    assert_eq!(registry.active_family(), MaterialFamily::Phong);
    for &mesh in &meshes {
        let material = scene.mesh_material(mesh).unwrap();
        assert!(material.as_phong().is_some());
        assert_eq!(material.get(PropertyKey::Metalness), None);
        assert_eq!(material.get(PropertyKey::Roughness), None);
        assert_eq!(
            material.get(PropertyKey::Color).and_then(|v| v.as_color()),
            Some(Color::from_hex(0x0033_6699))
        );
        assert!((scalar(&scene, mesh, PropertyKey::Reflectivity) - 0.4).abs() < 1e-6);
    }
    assert!((scalar(&scene, meshes[0], PropertyKey::Shininess)).abs() < 1e-6);

    registry.switch_family(&mut scene).unwrap();
    assert_eq!(registry.active_family(), MaterialFamily::Physical);
    for &mesh in &meshes {
        assert!((scalar(&scene, mesh, PropertyKey::Metalness) - 0.5).abs() < 1e-6);
        assert!((scalar(&scene, mesh, PropertyKey::Roughness) - 0.2).abs() < 1e-6);
    }
}

#[test]
fn switch_gives_every_target_the_same_material() {
    let (mut scene, meshes) = scene_with(4);
    let mut registry = registry_over(&meshes[1..]);
    registry.capture_current(&scene, meshes[0]).unwrap();

    let key = registry.switch_family(&mut scene).unwrap();
    for &mesh in &meshes {
        assert_eq!(scene.meshes[mesh].material, key);
    }
    assert_eq!(scene.materials.len(), 1);
}

#[test]
fn phong_only_properties_are_ignored_while_physical() {
    let (mut scene, meshes) = scene_with(1);
    let mut registry = MaterialRegistry::new();
    registry.capture_current(&scene, meshes[0]).unwrap();

    let err = registry
        .set_slider(&mut scene, PropertyKey::Shininess, 40.0)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedProperty { family: "Physical", .. }));

    registry.switch_family(&mut scene).unwrap();
    registry.set_slider(&mut scene, PropertyKey::Shininess, 40.0).unwrap();
    assert!((scalar(&scene, meshes[0], PropertyKey::Shininess) - 40.0).abs() < 1e-6);
}

// ============================================================================
// Activation
// ============================================================================

#[test]
fn activate_is_idempotent() {
    let (mut scene, meshes) = scene_with(2);
    let mut registry = registry_over(&meshes);
    registry.capture_current(&scene, meshes[0]).unwrap();

    assert!(registry.activate(&mut scene).unwrap());
    let count = registry.reconstruction_count();
    let material = scene.meshes[meshes[0]].material;

    assert!(!registry.activate(&mut scene).unwrap());
    assert!(!registry.activate(&mut scene).unwrap());
    assert_eq!(registry.reconstruction_count(), count);
    assert_eq!(scene.meshes[meshes[0]].material, material);

    registry
        .set_property(&mut scene, PropertyKey::Clearcoat, PropertyValue::Scalar(0.7))
        .unwrap();
    assert!(registry.activate(&mut scene).unwrap());
    assert_eq!(registry.reconstruction_count(), count + 1);
}

#[test]
fn set_family_takes_effect_on_activate() {
    let (mut scene, meshes) = scene_with(1);
    let mut registry = MaterialRegistry::new();
    registry.capture_current(&scene, meshes[0]).unwrap();
    registry.activate(&mut scene).unwrap();

    registry.set_family(MaterialFamily::Phong);
    assert!(scene.mesh_material(meshes[0]).unwrap().as_physical().is_some());
    assert!(registry.activate(&mut scene).unwrap());
    assert!(scene.mesh_material(meshes[0]).unwrap().as_phong().is_some());
}

#[test]
fn cleared_overrides_fall_back_to_the_snapshot() {
    let (mut scene, meshes) = scene_with(1);
    let mut registry = MaterialRegistry::new();
    registry.capture_current(&scene, meshes[0]).unwrap();
    let original = scalar(&scene, meshes[0], PropertyKey::Roughness);

    registry.set_slider(&mut scene, PropertyKey::Roughness, 90.0).unwrap();
    registry.clear_overrides();
    assert!(registry.activate(&mut scene).unwrap());
    assert!((scalar(&scene, meshes[0], PropertyKey::Roughness) - original).abs() < 1e-6);
}

// ============================================================================
// Guarded errors
// ============================================================================

#[test]
fn operations_before_capture_are_not_ready() {
    let (mut scene, _) = scene_with(1);
    let mut registry = MaterialRegistry::new();

    let errors = [
        registry.activate(&mut scene).map(|_| ()).unwrap_err(),
        registry.switch_family(&mut scene).map(|_| ()).unwrap_err(),
        registry
            .set_slider(&mut scene, PropertyKey::Roughness, 10.0)
            .unwrap_err(),
    ];
    for err in errors {
        assert!(matches!(err, Error::NotReady(_)));
        assert!(err.is_guarded());
    }
    assert!(registry.overrides().is_empty());
}

#[test]
fn removed_selection_is_not_ready() {
    let (mut scene, meshes) = scene_with(1);
    let mut registry = MaterialRegistry::new();
    registry.capture_current(&scene, meshes[0]).unwrap();

    let node = scene.mesh_node(meshes[0]).unwrap();
    scene.remove_node(node);
    assert!(matches!(registry.activate(&mut scene), Err(Error::NotReady(_))));
}

#[test]
fn missing_live_material_is_not_ready() {
    let (mut scene, meshes) = scene_with(1);
    let mut registry = MaterialRegistry::new();
    registry.capture_current(&scene, meshes[0]).unwrap();

    let material = scene.meshes[meshes[0]].material;
    scene.materials.remove(material);
    let err = registry
        .set_property(&mut scene, PropertyKey::Color, PropertyValue::Color(Color::BLACK))
        .unwrap_err();
    assert!(matches!(err, Error::NotReady("set_property")));
    assert!(registry.overrides().is_empty());
}

#[test]
fn reset_keeps_the_reconstruction_count() {
    let (mut scene, meshes) = scene_with(1);
    let mut registry = registry_over(&meshes);
    registry.capture_current(&scene, meshes[0]).unwrap();
    registry.switch_family(&mut scene).unwrap();

    registry.reset();
    assert!(registry.selected().is_none());
    assert!(registry.sync_targets().is_empty());
    assert_eq!(registry.active_family(), MaterialFamily::Physical);
    assert_eq!(registry.reconstruction_count(), 1);
}
