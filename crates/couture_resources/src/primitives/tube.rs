use glam::{Quat, Vec2, Vec3};

use crate::curve::Curve3;
use crate::geometry::Geometry;

pub struct TubeOptions {
    pub tubular_segments: u32,
    pub radius: f32,
    pub radial_segments: u32,
    pub closed: bool,
}

impl Default for TubeOptions {
    fn default() -> Self {
        Self {
            tubular_segments: 64,
            radius: 1.0,
            radial_segments: 8,
            closed: false,
        }
    }
}

/// Rotation-minimising frames along a curve.
struct Frames {
    tangents: Vec<Vec3>,
    normals: Vec<Vec3>,
    binormals: Vec<Vec3>,
}

fn compute_frames(curve: &dyn Curve3, segments: u32, closed: bool) -> Frames {
    let tangents: Vec<Vec3> = (0..=segments)
        .map(|i| curve.tangent_at(i as f32 / segments as f32))
        .collect();
    let n = tangents.len();
    let mut normals = vec![Vec3::ZERO; n];
    let mut binormals = vec![Vec3::ZERO; n];

    // Seed with the axis least aligned with the first tangent.
    let t0 = tangents[0];
    let abs = t0.abs();
    let seed = if abs.x <= abs.y && abs.x <= abs.z {
        Vec3::X
    } else if abs.y <= abs.z {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let side = t0.cross(seed).normalize_or_zero();
    normals[0] = t0.cross(side);
    binormals[0] = t0.cross(normals[0]);

    // Parallel transport
    for i in 1..n {
        normals[i] = normals[i - 1];
        let axis = tangents[i - 1].cross(tangents[i]);
        if axis.length() > f32::EPSILON {
            let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
            normals[i] = Quat::from_axis_angle(axis.normalize(), theta) * normals[i];
        }
        binormals[i] = tangents[i].cross(normals[i]);
    }

    // Spread the residual twist so the seam lines up.
    if closed {
        let last = n - 1;
        let mut theta = normals[0].dot(normals[last]).clamp(-1.0, 1.0).acos() / last as f32;
        if tangents[0].dot(normals[0].cross(normals[last])) > 0.0 {
            theta = -theta;
        }
        for i in 1..n {
            normals[i] = Quat::from_axis_angle(tangents[i], theta * i as f32) * normals[i];
            binormals[i] = tangents[i].cross(normals[i]);
        }
    }

    Frames {
        tangents,
        normals,
        binormals,
    }
}

/// Sweeps a circle of `radius` along `curve`.
///
/// `uv.x` runs from 0 to 1 along the path and `uv.y` around the tube.
#[must_use]
pub fn create_tube(curve: &dyn Curve3, options: &TubeOptions) -> Geometry {
    let tubular = options.tubular_segments.max(1);
    let radial = options.radial_segments.max(3);
    let frames = compute_frames(curve, tubular, options.closed);
    debug_assert_eq!(frames.tangents.len(), tubular as usize + 1);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();

    for i in 0..=tubular {
        // A closed tube reuses the first ring at the seam.
        let ring = if options.closed && i == tubular { 0 } else { i };
        let center = curve.point_at(ring as f32 / tubular as f32);
        let n = frames.normals[ring as usize];
        let b = frames.binormals[ring as usize];

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * std::f32::consts::TAU;
            let (sin, cos) = v.sin_cos();
            let normal = (-cos * n + sin * b).normalize_or_zero();
            positions.push(center + normal * options.radius);
            normals.push(normal);
            uvs.push(Vec2::new(i as f32 / tubular as f32, j as f32 / radial as f32));
        }
    }

    let stride = radial + 1;
    let mut indices = Vec::new();
    for i in 1..=tubular {
        for j in 1..=radial {
            let a = stride * (i - 1) + (j - 1);
            let b = stride * i + (j - 1);
            let c = stride * i + j;
            let d = stride * (i - 1) + j;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Geometry::new(positions)
        .with_normals(normals)
        .with_uvs(uvs)
        .with_indices(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CatmullRomCurve3, GrannyKnot};

    #[test]
    fn straight_tube_keeps_its_radius() {
        let line = CatmullRomCurve3::new(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)], false);
        let options = TubeOptions {
            tubular_segments: 4,
            radius: 2.0,
            radial_segments: 8,
            closed: false,
        };
        let g = create_tube(&line, &options);
        assert_eq!(g.vertex_count(), 5 * 9);
        for p in g.positions() {
            let radial = Vec2::new(p.x, p.y).length();
            assert!((radial - 2.0).abs() < 1e-3, "radius {radial}");
        }
    }

    #[test]
    fn uv_x_runs_along_the_path() {
        let g = create_tube(&GrannyKnot, &TubeOptions {
            tubular_segments: 10,
            closed: true,
            ..Default::default()
        });
        let uvs = g.uvs().unwrap();
        assert_eq!(uvs.first().map(|uv| uv.x), Some(0.0));
        assert_eq!(uvs.last().map(|uv| uv.x), Some(1.0));
    }
}
