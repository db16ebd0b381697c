//! CPU-side triangle geometry and the post-load processing passes.
//!
//! Meshes arrive from the OBJ loader as raw position/normal/uv streams.
//! Before they are displayed every mesh runs through [`Geometry::normalize`]:
//!
//! 1. merge vertices that share a position,
//! 2. recompute smooth (area weighted) vertex normals,
//! 3. generate planar texture coordinates when the source had none.
//!
//! The whole pass is idempotent: normalizing twice yields the same buffers.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Affine3A, Vec2, Vec3};
use rustc_hash::FxHashMap;
use uuid::Uuid;
use wgpu::PrimitiveTopology;

/// Quantization used when merging vertices (4 decimal places).
const MERGE_PRECISION: f32 = 1e4;

/// Default crease angle for [`Geometry::edges`], in degrees.
pub const DEFAULT_EDGE_THRESHOLD_DEG: f32 = 1.0;

static NEXT_GEOMETRY_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_GEOMETRY_VERSION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

impl BoundingBox {
    /// Smallest box containing every point, `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest side length.
    #[must_use]
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let transformed = corners.map(|c| matrix.transform_point3(c));
        // Eight corners, never empty.
        Self::from_points(&transformed).unwrap_or(*self)
    }

    /// Axis pair `(u, v)` spanning the plane of the two largest extents.
    ///
    /// Ties keep the XY plane, then XZ.
    #[must_use]
    pub fn dominant_plane(&self) -> (usize, usize) {
        let size = self.size();
        // Drop the thinnest axis; on ties prefer dropping Z, then Y.
        let dropped = if size.z <= size.x && size.z <= size.y {
            2
        } else if size.y <= size.x {
            1
        } else {
            0
        };
        match dropped {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        }
    }
}

/// Triangle or line-list geometry with optional normals, uvs and indices.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub uuid: Uuid,
    pub topology: PrimitiveTopology,

    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    uvs: Option<Vec<Vec2>>,
    indices: Option<Vec<u32>>,

    bounding_box: Option<BoundingBox>,
    version: u64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Geometry {
    #[must_use]
    pub fn new(positions: Vec<Vec3>) -> Self {
        let bounding_box = BoundingBox::from_points(&positions);
        Self {
            uuid: Uuid::new_v4(),
            topology: PrimitiveTopology::TriangleList,
            positions,
            normals: None,
            uvs: None,
            indices: None,
            bounding_box,
            version: next_version(),
        }
    }

    #[must_use]
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.set_indices(indices);
        self
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.set_normals(normals);
        self
    }

    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.set_uvs(uvs);
        self
    }

    // ========== Accessors ==========

    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[must_use]
    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    #[must_use]
    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uvs.as_deref()
    }

    #[must_use]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Monotonic version, bumped on every mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }

    /// Raw position bytes for upload.
    #[must_use]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    #[must_use]
    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices.as_deref().map(bytemuck::cast_slice)
    }

    // ========== Mutators ==========

    pub fn set_positions(&mut self, positions: Vec<Vec3>) {
        self.bounding_box = BoundingBox::from_points(&positions);
        self.positions = positions;
        self.version = next_version();
    }

    pub fn set_normals(&mut self, normals: Vec<Vec3>) {
        self.normals = (normals.len() == self.positions.len()).then_some(normals);
        self.version = next_version();
    }

    pub fn set_uvs(&mut self, uvs: Vec<Vec2>) {
        if uvs.len() == self.positions.len() {
            self.uvs = Some(uvs);
        } else {
            log::warn!(
                "Ignoring uv stream of length {} for {} vertices",
                uvs.len(),
                self.positions.len()
            );
            self.uvs = None;
        }
        self.version = next_version();
    }

    pub fn set_indices(&mut self, indices: Vec<u32>) {
        self.indices = Some(indices);
        self.version = next_version();
    }

    // ========== Topology helpers ==========

    /// Triangles as vertex index triples, for indexed and non-indexed data.
    ///
    /// Triangles referencing out-of-range vertices are skipped.
    #[must_use]
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        if self.topology != PrimitiveTopology::TriangleList {
            return Vec::new();
        }
        let count = self.positions.len() as u32;
        let tris: Vec<[u32; 3]> = match &self.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
            None => (0..count / 3).map(|t| [t * 3, t * 3 + 1, t * 3 + 2]).collect(),
        };
        tris.into_iter()
            .filter(|t| t.iter().all(|&i| i < count))
            .collect()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles().len()
    }

    // ========== Processing passes ==========

    /// Welds vertices sharing a position (to 4 decimal places).
    ///
    /// The result is indexed; the first occurrence of a position keeps its
    /// uv. Normals are dropped since they no longer match the topology.
    /// Triangles collapsed to a line or point are removed.
    pub fn merge_vertices(&mut self) {
        if self.topology != PrimitiveTopology::TriangleList {
            return;
        }
        let triangles = self.triangles();

        let mut lookup: FxHashMap<[i64; 3], u32> = FxHashMap::default();
        let mut remap = Vec::with_capacity(self.positions.len());
        let mut positions = Vec::new();
        let mut uvs = self.uvs.as_ref().map(|_| Vec::new());

        for (i, p) in self.positions.iter().enumerate() {
            let key = quantize(*p);
            let next = positions.len() as u32;
            let target = *lookup.entry(key).or_insert_with(|| {
                positions.push(*p);
                if let (Some(out), Some(src)) = (uvs.as_mut(), self.uvs.as_ref()) {
                    out.push(src[i]);
                }
                next
            });
            remap.push(target);
        }

        let indices: Vec<u32> = triangles
            .into_iter()
            .map(|t| t.map(|i| remap[i as usize]))
            .filter(|[a, b, c]| a != b && b != c && a != c)
            .flatten()
            .collect();

        log::debug!(
            "merge_vertices: {} -> {} vertices",
            self.positions.len(),
            positions.len()
        );

        self.positions = positions;
        self.uvs = uvs;
        self.normals = None;
        self.indices = Some(indices);
        self.bounding_box = BoundingBox::from_points(&self.positions);
        self.version = next_version();
    }

    /// Smooth per-vertex normals weighted by adjacent triangle area.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for [i0, i1, i2] in self.triangles() {
            let v0 = self.positions[i0 as usize];
            let v1 = self.positions[i1 as usize];
            let v2 = self.positions[i2 as usize];
            // |cross| is twice the triangle area
            let face_normal = (v1 - v0).cross(v2 - v0);
            normals[i0 as usize] += face_normal;
            normals[i1 as usize] += face_normal;
            normals[i2 as usize] += face_normal;
        }

        for n in &mut normals {
            *n = n.normalize_or_zero();
        }

        self.normals = Some(normals);
        self.version = next_version();
    }

    /// Planar projection onto the dominant bounding-box plane.
    ///
    /// `uv = (coord - center) / max_extent + 0.5` for the two axes of the
    /// plane, so every coordinate lands in `[0, 1]`.
    pub fn compute_planar_uvs(&mut self) {
        let Some(bbox) = self.bounding_box else {
            return;
        };
        let (u_axis, v_axis) = bbox.dominant_plane();
        let center = bbox.center();
        let scale = bbox.max_extent();
        let scale = if scale > f32::EPSILON { scale } else { 1.0 };

        let uvs = self
            .positions
            .iter()
            .map(|p| {
                let d = (*p - center) / scale;
                Vec2::new(d[u_axis] + 0.5, d[v_axis] + 0.5)
            })
            .collect();

        self.uvs = Some(uvs);
        self.version = next_version();
    }

    /// Full post-load pass: merge, normals, uvs when missing.
    pub fn normalize(&mut self) {
        self.merge_vertices();
        self.compute_vertex_normals();
        if self.uvs.is_none() {
            self.compute_planar_uvs();
        }
    }

    /// Outline segments: boundary edges and creases sharper than
    /// `threshold_deg` between adjacent faces.
    ///
    /// Returns a `LineList` geometry.
    #[must_use]
    pub fn edges(&self, threshold_deg: f32) -> Geometry {
        let cos_threshold = threshold_deg.to_radians().cos();

        // Key by quantized positions so seams split by uvs still pair up.
        let keys: Vec<[i64; 3]> = self.positions.iter().map(|p| quantize(*p)).collect();

        struct EdgeEntry {
            a: u32,
            b: u32,
            normal: Vec3,
            shared: bool,
            crease: bool,
        }

        let mut order: Vec<([i64; 3], [i64; 3])> = Vec::new();
        let mut edges: FxHashMap<([i64; 3], [i64; 3]), EdgeEntry> = FxHashMap::default();

        for tri in self.triangles() {
            let [v0, v1, v2] = tri.map(|i| self.positions[i as usize]);
            let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            if normal == Vec3::ZERO {
                continue;
            }

            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let (ka, kb) = (keys[a as usize], keys[b as usize]);
                let key = if ka <= kb { (ka, kb) } else { (kb, ka) };
                match edges.get_mut(&key) {
                    Some(entry) if !entry.shared => {
                        entry.shared = true;
                        entry.crease = entry.normal.dot(normal) <= cos_threshold;
                    }
                    Some(_) => {}
                    None => {
                        order.push(key);
                        edges.insert(
                            key,
                            EdgeEntry {
                                a,
                                b,
                                normal,
                                shared: false,
                                crease: false,
                            },
                        );
                    }
                }
            }
        }

        let mut positions = Vec::new();
        for key in order {
            let Some(entry) = edges.get(&key) else {
                continue;
            };
            if !entry.shared || entry.crease {
                positions.push(self.positions[entry.a as usize]);
                positions.push(self.positions[entry.b as usize]);
            }
        }

        let mut lines = Geometry::new(positions);
        lines.topology = PrimitiveTopology::LineList;
        lines
    }
}

fn quantize(p: Vec3) -> [i64; 3] {
    let q = |c: f32| (c * MERGE_PRECISION).round() as i64;
    [q(p.x), q(p.y), q(p.z)]
}
