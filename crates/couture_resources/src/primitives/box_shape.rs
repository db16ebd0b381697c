use glam::{Vec2, Vec3};

use crate::geometry::Geometry;

/// Axis-aligned box centred on the origin, 4 vertices per face.
#[must_use]
pub fn create_box(width: f32, height: f32, depth: f32) -> Geometry {
    let half = Vec3::new(width, height, depth) * 0.5;

    // (normal, u direction, v direction) per face; v points down the image.
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::NEG_Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::NEG_Y),
        (Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::X, Vec3::NEG_Z, Vec3::NEG_Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::NEG_Y),
    ];
    let corners = [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);

    for (normal, u_dir, v_dir) in faces {
        for uv in corners {
            let offset = normal + u_dir * (uv.x * 2.0 - 1.0) + v_dir * (uv.y * 2.0 - 1.0);
            positions.push(offset * half);
            normals.push(normal);
            uvs.push(uv);
        }
    }

    // Two CCW triangles per face
    let indices: Vec<u32> = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

    Geometry::new(positions)
        .with_normals(normals)
        .with_uvs(uvs)
        .with_indices(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_24_vertices_and_12_triangles() {
        let g = create_box(2.0, 4.0, 6.0);
        assert_eq!(g.vertex_count(), 24);
        assert_eq!(g.triangle_count(), 12);
        let bbox = g.bounding_box().unwrap();
        assert_eq!(bbox.size(), Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn triangles_face_outward() {
        let g = create_box(1.0, 1.0, 1.0);
        let normals = g.normals().unwrap();
        for [a, b, c] in g.triangles() {
            let p = g.positions();
            let n = (p[b as usize] - p[a as usize]).cross(p[c as usize] - p[a as usize]);
            assert!(n.dot(normals[a as usize]) > 0.0);
        }
    }
}
