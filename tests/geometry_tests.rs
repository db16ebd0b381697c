//! Geometry Processing Tests
//!
//! Tests for:
//! - Post-load normalization: vertex welding, smooth normals
//! - Planar uv projection onto the dominant bounding-box plane
//! - Edge extraction for the wireframe overlay
//! - OBJ parsing into normalized model parts

use couture::assets::parse_obj;
use couture::glam::{Vec2, Vec3};
use couture::resources::primitives::create_box;
use couture::resources::{DEFAULT_EDGE_THRESHOLD_DEG, Geometry};

const EPS: f32 = 1e-5;

fn assert_vec2_eq(a: Vec2, b: Vec2) {
    assert!((a - b).length() < EPS, "expected {b:?}, got {a:?}");
}

/// Two unindexed triangles forming a 2x1 rectangle in the XY plane.
fn flat_rect() -> Geometry {
    Geometry::new(vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(2.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(2.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ])
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn normalize_welds_duplicate_corners() {
    let mut geometry = flat_rect();
    geometry.normalize();

    assert_eq!(geometry.vertex_count(), 4);
    assert_eq!(geometry.triangle_count(), 2);
    assert_eq!(geometry.indices().map(<[u32]>::len), Some(6));
}

#[test]
fn normalize_is_idempotent() {
    let mut once = flat_rect();
    once.normalize();
    let mut twice = once.clone();
    twice.normalize();

    assert_eq!(once.positions(), twice.positions());
    assert_eq!(once.indices(), twice.indices());
}

#[test]
fn flat_surface_normals_face_the_viewer() {
    let mut geometry = flat_rect();
    geometry.normalize();

    let normals = geometry.normals().unwrap();
    assert_eq!(normals.len(), geometry.vertex_count());
    for n in normals {
        assert!((*n - Vec3::Z).length() < EPS, "normal {n:?}");
    }
}

#[test]
fn box_normals_are_unit_length() {
    let mut geometry = create_box(2.0, 2.0, 2.0);
    geometry.normalize();

    assert_eq!(geometry.vertex_count(), 8);
    for n in geometry.normals().unwrap() {
        assert!((n.length() - 1.0).abs() < 1e-4);
    }
}

// ============================================================================
// Planar uvs
// ============================================================================

#[test]
fn planar_uvs_use_the_largest_extent() {
    let mut geometry = flat_rect();
    geometry.normalize();

    // center (1, 0.5), max extent 2: uv = (p - center) / 2 + 0.5
    let uvs = geometry.uvs().unwrap();
    for (p, uv) in geometry.positions().iter().zip(uvs) {
        let expected = Vec2::new((p.x - 1.0) / 2.0 + 0.5, (p.y - 0.5) / 2.0 + 0.5);
        assert_vec2_eq(*uv, expected);
    }
}

#[test]
fn planar_uvs_stay_in_unit_range() {
    let mut geometry = Geometry::new(vec![
        Vec3::new(-3.0, 0.0, -1.0),
        Vec3::new(5.0, 0.0, -1.0),
        Vec3::new(5.0, 0.5, 4.0),
    ]);
    geometry.normalize();

    for uv in geometry.uvs().unwrap() {
        assert!((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y), "{uv:?}");
    }
}

#[test]
fn existing_uvs_survive_normalization() {
    let mut geometry = create_box(1.0, 1.0, 1.0);
    let before: Vec<Vec2> = geometry.uvs().unwrap().to_vec();
    geometry.normalize();

    let after = geometry.uvs().unwrap();
    assert!(after.iter().all(|uv| before.contains(uv)));
}

// ============================================================================
// Edges
// ============================================================================

#[test]
fn box_edges_are_its_twelve_creases() {
    let geometry = create_box(1.0, 1.0, 1.0);
    let edges = geometry.edges(DEFAULT_EDGE_THRESHOLD_DEG);

    // Face diagonals are coplanar and drop out.
    assert_eq!(edges.vertex_count(), 24);
}

#[test]
fn flat_rect_keeps_only_its_outline() {
    let mut geometry = flat_rect();
    geometry.normalize();
    let edges = geometry.edges(DEFAULT_EDGE_THRESHOLD_DEG);
    assert_eq!(edges.vertex_count(), 8);
}

// ============================================================================
// OBJ parsing
// ============================================================================

#[test]
fn obj_objects_become_separate_parts() {
    let text = "\
o shirt
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
o trousers
v 0 0 1
v 1 0 1
v 0 1 1
f 5 6 7
";
    let model = pollster::block_on(parse_obj("outfit.obj", text)).unwrap();
    assert_eq!(model.source, "outfit.obj");
    assert_eq!(model.parts.len(), 2);
    assert_eq!(model.parts[0].name, "shirt");
    // The quad is triangulated.
    assert_eq!(model.parts[0].geometry.triangle_count(), 2);
    assert!(model.parts.iter().all(|p| p.geometry.uvs().is_some()));
    assert_eq!(model.vertex_count(), 7);
}

#[test]
fn obj_without_faces_is_rejected() {
    let result = pollster::block_on(parse_obj("points.obj", "v 0 0 0\nv 1 0 0\n"));
    assert!(result.is_err());
}
