//! Scene Graph Tests
//!
//! Tests for:
//! - Hierarchy: parenting, subtree removal, world matrices
//! - Shared materials and pruning
//! - Studio stage layout: lights, ground, sample shapes
//! - Orbit camera limits and aspect tracking
//! - Measurement guide lifecycle

use std::sync::Arc;

use couture::assets::EnvironmentSet;
use couture::base::{ButtonState, Color, Input, MouseButton};
use couture::glam::Vec3;
use couture::resources::Material;
use couture::resources::primitives::create_box;
use couture::scene::{
    GuideLine, LightKind, MeasurementPath, MeasurementTable, Mesh, MeshRole, Node, OrbitControls,
    Scene, Transform,
};
use couture::studio::SessionSettings;
use couture::StudioSession;

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-3
}

fn session() -> StudioSession {
    StudioSession::new(
        &SessionSettings::default(),
        EnvironmentSet::new(),
        MeasurementTable::new(vec![MeasurementPath::new(
            "waist",
            vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0)],
            true,
        )]),
    )
    .unwrap()
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn world_matrices_compose_parent_scale_and_offset() {
    let mut scene = Scene::new();
    let mut parent = Node::new("stage");
    parent.transform.position = Vec3::new(0.0, -58.0, 0.0);
    parent.transform.scale = Vec3::splat(0.5);
    let parent = scene.add_node(parent);

    let mut child = Node::new("child");
    child.transform.position = Vec3::new(10.0, 20.0, 0.0);
    let child = scene.add_to_parent(child, parent);

    scene.update_matrix_world();
    assert!(approx(scene.world_position(child).unwrap(), Vec3::new(5.0, -48.0, 0.0)));
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));
    assert_eq!(scene.get_node(parent).unwrap().children(), [child]);
}

#[test]
fn removing_a_node_drops_its_subtree_and_components() {
    let mut scene = Scene::new();
    let material = scene.add_material(Material::new_physical(Color::WHITE));
    let geometry = Arc::new(create_box(1.0, 1.0, 1.0));

    let root = scene.add_node(Node::new("model"));
    let part = scene.add_mesh_to_parent(Mesh::new("part", geometry.clone(), material), root);
    let overlay = scene.add_mesh_to_parent(
        Mesh::new("edges", geometry, material).with_role(MeshRole::WireframeOverlay),
        part,
    );
    assert_eq!(scene.meshes_in_subtree(root, MeshRole::Surface).len(), 1);
    assert_eq!(scene.meshes_in_subtree(root, MeshRole::WireframeOverlay).len(), 1);

    scene.remove_node(root);
    assert!(scene.get_node(part).is_none());
    assert!(scene.get_node(overlay).is_none());
    assert!(scene.meshes.is_empty());
    // Materials outlive their meshes until pruned.
    assert_eq!(scene.materials.len(), 1);
    assert_eq!(scene.prune_unreferenced_materials(), 1);
}

#[test]
fn camera_node_cannot_be_removed() {
    let mut scene = Scene::new();
    let camera = scene.camera_node;
    scene.remove_node(camera);
    assert!(scene.get_node(camera).is_some());
}

#[test]
fn assigning_one_material_shares_it() {
    let mut scene = Scene::new();
    let geometry = Arc::new(create_box(1.0, 1.0, 1.0));
    let mut meshes = Vec::new();
    for name in ["a", "b", "c"] {
        let material = scene.add_material(Material::new_phong(Color::WHITE));
        let node = scene.add_mesh(Mesh::new(name, geometry.clone(), material));
        meshes.push(scene.get_node(node).unwrap().mesh.unwrap());
    }

    let shared = scene.add_material(Material::new_physical(Color::BLACK));
    assert_eq!(scene.assign_material(shared, &meshes), 3);
    assert_eq!(scene.prune_unreferenced_materials(), 3);
    assert!(meshes.iter().all(|m| scene.meshes[*m].material == shared));
}

#[test]
fn subtree_bounds_follow_world_transforms() {
    let mut scene = Scene::new();
    let material = scene.add_material(Material::new_physical(Color::WHITE));
    let mut root = Node::new("root");
    root.transform.position = Vec3::new(10.0, 0.0, 0.0);
    let root = scene.add_node(root);
    scene.add_mesh_to_parent(Mesh::new("cube", Arc::new(create_box(2.0, 2.0, 2.0)), material), root);

    scene.update_matrix_world();
    let bounds = scene.subtree_bounding_box(root).unwrap();
    assert!(approx(bounds.min, Vec3::new(9.0, -1.0, -1.0)));
    assert!(approx(bounds.max, Vec3::new(11.0, 1.0, 1.0)));
}

// ============================================================================
// Studio stage
// ============================================================================

#[test]
fn stage_holds_lights_ground_and_samples() {
    let mut session = session();
    let stage = session.stage();
    let scene = session.scene();

    let kinds: Vec<LightKind> = scene.lights.values().map(|l| l.kind.clone()).collect();
    assert_eq!(kinds.len(), 3);
    assert_eq!(kinds.iter().filter(|k| **k == LightKind::Ambient).count(), 1);

    let ground = scene.get_node(session.ground()).unwrap();
    assert!(!ground.visible);
    assert_eq!(ground.parent(), Some(stage));

    assert_eq!(session.registry().sync_targets().len(), 3);
    for mesh in session.samples().meshes() {
        let node = scene.mesh_node(mesh).unwrap();
        assert_eq!(scene.get_node(node).unwrap().parent(), Some(stage));
    }

    session.scene_mut().update_matrix_world();
    let sphere = session.scene().mesh_node(session.samples().sphere).unwrap();
    // Stage offset (0, -58) and scale 0.06 applied to (1000, 1000, 0).
    assert!(approx(
        session.scene().world_position(sphere).unwrap(),
        Vec3::new(60.0, 2.0, 0.0)
    ));
}

#[test]
fn ambient_light_is_adjustable() {
    let mut session = session();
    session.set_ambient(Color::from_hex(0xffeedd), 0.8);
    session.set_ambient(Color::from_hex(0xffeedd), -1.0);

    let ambient = session
        .scene()
        .lights
        .values()
        .find(|l| l.kind == LightKind::Ambient)
        .unwrap();
    assert_eq!(ambient.color, Color::from_hex(0xffeedd));
    assert!(ambient.intensity.abs() < f32::EPSILON);
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn orbit_clamps_zoom_and_polar_angle() {
    let mut orbit = OrbitControls::from_position(Vec3::new(0.0, 50.0, 130.0), Vec3::ZERO);
    orbit.set_distance_limits(20.0, 300.0);
    orbit.set_polar_band(std::f32::consts::FRAC_PI_4);
    orbit.enable_damping = false;

    let mut transform = Transform::new();
    let mut input = Input::new();
    input.inject_resize(800, 600);
    input.inject_scroll(0.0, -500.0);
    orbit.update(&mut transform, &input, 1.0 / 60.0);
    assert!((orbit.radius - 300.0).abs() < 1e-3);

    input.start_frame();
    input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
    input.inject_mouse_position(400.0, 300.0);
    input.inject_mouse_position(400.0, 5000.0);
    orbit.update(&mut transform, &input, 1.0 / 60.0);
    assert!(orbit.phi >= std::f32::consts::FRAC_PI_4 - 1e-4);
    assert!(orbit.phi <= 3.0 * std::f32::consts::FRAC_PI_4 + 1e-4);
    assert!(approx(transform.position, orbit.position()));
}

#[test]
fn camera_aspect_follows_the_surface() {
    let mut session = session();
    let mut input = Input::new();
    input.inject_resize(1200, 600);
    session.update_camera(&input, 1.0 / 60.0);
    assert!((session.scene().camera.aspect - 2.0).abs() < 1e-5);

    // A zero-sized surface keeps the last aspect.
    session.update_camera(&Input::new(), 1.0 / 60.0);
    assert!((session.scene().camera.aspect - 2.0).abs() < 1e-5);
}

// ============================================================================
// Measurement guide
// ============================================================================

#[test]
fn guide_adds_two_layers_and_cleans_up() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("stage"));
    let path = MeasurementPath::new("arm", vec![Vec3::ZERO, Vec3::X, Vec3::Y], false);

    let mut guide = GuideLine::new(1.0, 2.0);
    guide.advance(&mut scene);
    assert!(guide.time().abs() < f32::EPSILON);

    guide.show(&mut scene, parent, &path);
    assert_eq!(scene.meshes_in_subtree(parent, MeshRole::Guide).len(), 2);
    assert_eq!(scene.materials.len(), 2);
    guide.advance(&mut scene);
    assert!(guide.time() > 0.0);

    // Showing again replaces rather than stacks.
    guide.show(&mut scene, parent, &path);
    assert_eq!(scene.meshes_in_subtree(parent, MeshRole::Guide).len(), 2);
    assert!(guide.time().abs() < f32::EPSILON);

    guide.hide(&mut scene);
    assert!(scene.meshes.is_empty());
    assert!(scene.materials.is_empty());
    assert!(!guide.is_visible());
}

#[test]
fn session_guide_sits_on_the_stage() {
    let mut session = session();
    session.select_measurement(0).unwrap();
    let (front, back) = session.guide().nodes().unwrap();
    let stage = session.stage();
    for node in [front, back] {
        assert_eq!(session.scene().get_node(node).unwrap().parent(), Some(stage));
    }

    session.clear_measurement();
    assert!(session.scene().get_node(front).is_none());
    assert_eq!(session.selected_measurement(), None);
}
