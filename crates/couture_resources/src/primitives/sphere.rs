use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::geometry::Geometry;

pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

/// UV sphere, pole-to-pole along Y.
#[must_use]
pub fn create_sphere(options: &SphereOptions) -> Geometry {
    let radius = options.radius;
    let width_segments = options.width_segments.max(3);
    let height_segments = options.height_segments.max(2);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();

    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        let theta = v * PI;
        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;
            let phi = u * TAU;

            let normal = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            positions.push(normal * radius);
            normals.push(normal);
            uvs.push(Vec2::new(u, 1.0 - v));
        }
    }

    let stride = width_segments + 1;
    let mut indices = Vec::new();
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * stride + x + 1;
            let b = y * stride + x;
            let c = (y + 1) * stride + x;
            let d = (y + 1) * stride + x + 1;

            // Skip the degenerate half of the pole quads.
            if y != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if y != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry::new(positions)
        .with_normals(normals)
        .with_uvs(uvs)
        .with_indices(indices)
}
