use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::geometry::Geometry;

/// Flat disc in the XY plane facing +Z, as a triangle fan.
///
/// Low segment counts give regular polygons (6 gives the ground hexagon).
#[must_use]
pub fn create_circle(radius: f32, segments: u32) -> Geometry {
    let segments = segments.max(3);

    let mut positions = vec![Vec3::ZERO];
    let mut uvs = vec![Vec2::splat(0.5)];
    for i in 0..=segments {
        let angle = i as f32 / segments as f32 * TAU;
        let (sin, cos) = angle.sin_cos();
        positions.push(Vec3::new(cos * radius, sin * radius, 0.0));
        uvs.push(Vec2::new((cos + 1.0) * 0.5, (sin + 1.0) * 0.5));
    }
    let normals = vec![Vec3::Z; positions.len()];

    let indices: Vec<u32> = (1..=segments).flat_map(|i| [i, i + 1, 0]).collect();

    Geometry::new(positions)
        .with_normals(normals)
        .with_uvs(uvs)
        .with_indices(indices)
}
