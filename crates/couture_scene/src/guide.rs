use std::sync::Arc;

use couture_core::{MaterialKey, NodeKey};
use couture_resources::Material;
use couture_resources::primitives::{TubeOptions, create_tube};

use crate::measurement::MeasurementPath;
use crate::mesh::{Mesh, MeshRole};
use crate::scene::Scene;

/// Time added per frame at animation speed 1.
pub const GUIDE_TIME_STEP: f32 = 0.01;
/// Opacity of the layer drawn where the guide is hidden behind the body.
pub const GUIDE_BACK_OPACITY: f32 = 0.3;
const GUIDE_RADIAL_SEGMENTS: u32 = 8;

#[derive(Debug, Clone, Copy)]
struct GuideNodes {
    back: NodeKey,
    front: NodeKey,
    back_material: MaterialKey,
    front_material: MaterialKey,
}

/// The animated measurement tube.
///
/// Two meshes share one tube geometry: a faded back layer that only passes
/// the depth test where the body is in front, and an opaque front layer.
/// Both reveal themselves from the start of the path as `time` grows.
#[derive(Debug)]
pub struct GuideLine {
    pub speed: f32,
    pub radius: f32,
    time: f32,
    nodes: Option<GuideNodes>,
}

impl GuideLine {
    #[must_use]
    pub fn new(speed: f32, radius: f32) -> Self {
        Self {
            speed,
            radius,
            time: 0.0,
            nodes: None,
        }
    }

    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.nodes.is_some()
    }

    /// Front and back mesh nodes, when a path is shown.
    #[must_use]
    pub fn nodes(&self) -> Option<(NodeKey, NodeKey)> {
        self.nodes.map(|n| (n.front, n.back))
    }

    /// Replaces the displayed path and restarts the animation.
    pub fn show(&mut self, scene: &mut Scene, parent: NodeKey, path: &MeasurementPath) {
        self.hide(scene);

        let curve = path.curve();
        let geometry = Arc::new(create_tube(
            &curve,
            &TubeOptions {
                tubular_segments: path.segments(),
                radius: self.radius,
                radial_segments: GUIDE_RADIAL_SEGMENTS,
                closed: path.is_closed(),
            },
        ));

        let back_material = scene.add_material(Material::new_guide_back(GUIDE_BACK_OPACITY));
        let front_material = scene.add_material(Material::new_guide_front());

        let back = scene.add_mesh_to_parent(
            Mesh::new("guide back", geometry.clone(), back_material).with_role(MeshRole::Guide),
            parent,
        );
        let front = scene.add_mesh_to_parent(
            Mesh::new("guide front", geometry, front_material)
                .with_role(MeshRole::Guide)
                .with_render_order(1),
            parent,
        );

        self.nodes = Some(GuideNodes {
            back,
            front,
            back_material,
            front_material,
        });
        self.time = 0.0;
        self.sync_time(scene);
        log::debug!("Showing guide '{}'", path.label());
    }

    pub fn hide(&mut self, scene: &mut Scene) {
        if let Some(nodes) = self.nodes.take() {
            scene.remove_node(nodes.back);
            scene.remove_node(nodes.front);
            scene.materials.remove(nodes.back_material);
            scene.materials.remove(nodes.front_material);
        }
        self.time = 0.0;
    }

    /// Per-frame step. Time keeps growing past 1; the reveal then holds and
    /// the colour keeps cycling.
    pub fn advance(&mut self, scene: &mut Scene) {
        if self.nodes.is_none() {
            return;
        }
        self.time += GUIDE_TIME_STEP * self.speed;
        self.sync_time(scene);
    }

    fn sync_time(&self, scene: &mut Scene) {
        let Some(nodes) = self.nodes else {
            return;
        };
        for key in [nodes.back_material, nodes.front_material] {
            if let Some(material) = scene.material_mut(key)
                && let Some(guide) = material.as_guide_line_mut()
            {
                guide.time = self.time;
                material.mark_dirty();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use couture_resources::MaterialData;
    use glam::Vec3;

    use super::*;
    use crate::node::Node;

    fn path() -> MeasurementPath {
        MeasurementPath::new(
            "Chest Circumference",
            vec![
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 10.0),
                Vec3::new(-10.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -10.0),
            ],
            true,
        )
    }

    #[test]
    fn advance_accumulates_scaled_time() {
        let mut scene = Scene::new();
        let stage = scene.add_node(Node::new("stage"));
        let mut guide = GuideLine::new(1.4, 4.0);
        guide.show(&mut scene, stage, &path());
        guide.advance(&mut scene);
        guide.advance(&mut scene);
        assert!((guide.time() - 0.028).abs() < 1e-6);

        let (front, _) = guide.nodes().unwrap();
        let mesh = scene.get_node(front).unwrap().mesh.unwrap();
        let material = scene.mesh_material(mesh).unwrap();
        assert!((material.as_guide_line().unwrap().time - 0.028).abs() < 1e-6);
    }

    #[test]
    fn changing_path_resets_time() {
        let mut scene = Scene::new();
        let stage = scene.add_node(Node::new("stage"));
        let mut guide = GuideLine::new(1.0, 4.0);
        guide.show(&mut scene, stage, &path());
        guide.advance(&mut scene);
        guide.show(&mut scene, stage, &path());
        assert_eq!(guide.time(), 0.0);
        // Old layers are gone: only the new pair remains.
        assert_eq!(scene.meshes.len(), 2);
        assert_eq!(scene.materials.len(), 2);
    }

    #[test]
    fn back_layer_is_depth_inverted() {
        let mut scene = Scene::new();
        let stage = scene.add_node(Node::new("stage"));
        let mut guide = GuideLine::new(1.0, 4.0);
        guide.show(&mut scene, stage, &path());
        let (_, back) = guide.nodes().unwrap();
        let mesh = scene.get_node(back).unwrap().mesh.unwrap();
        let material = scene.mesh_material(mesh).unwrap();
        assert!(!material.settings.depth_write);
        assert_eq!(material.settings.depth_compare, wgpu::CompareFunction::Greater);
        assert!(matches!(material.data, MaterialData::GuideLine(_)));

        guide.hide(&mut scene);
        assert!(scene.meshes.is_empty());
    }
}
