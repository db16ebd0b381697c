//! Decorative shapes placed around the model that mirror its material.

use std::sync::Arc;

use couture_core::{MaterialKey, MeshKey, NodeKey};
use couture_resources::primitives::{SphereOptions, TubeOptions, create_box, create_sphere, create_tube};
use couture_resources::{Geometry, GrannyKnot, Material};
use couture_scene::{Mesh, Node, Scene};
use glam::Vec3;

use crate::registry::MaterialRegistry;

/// Sample meshes on stage.
#[derive(Debug, Clone)]
pub struct SampleShapes {
    pub sphere: MeshKey,
    pub heart: MeshKey,
    pub knot: MeshKey,
}

impl SampleShapes {
    /// Adds the three shapes under `parent` and registers each one as a
    /// sync target so they follow every broadcast.
    pub fn spawn(
        scene: &mut Scene,
        registry: &mut MaterialRegistry,
        parent: NodeKey,
        material: Material,
    ) -> Self {
        let material = scene.add_material(material.with_name("samples"));

        let sphere = create_sphere(&SphereOptions {
            radius: 250.0,
            width_segments: 32,
            height_segments: 16,
        });
        let sphere = place(scene, parent, "sample-sphere", sphere, material, Vec3::new(1000.0, 1000.0, 0.0), 1.0);

        // Box stand-in for the extruded heart outline.
        let heart = create_box(20.0, 20.0, 8.0);
        let heart = place(scene, parent, "sample-heart", heart, material, Vec3::new(-1000.0, 1000.0, 0.0), 10.0);

        let knot = create_tube(
            &GrannyKnot,
            &TubeOptions {
                tubular_segments: 100,
                radius: 3.0,
                radial_segments: 8,
                closed: true,
            },
        );
        let knot = place(scene, parent, "sample-knot", knot, material, Vec3::new(-1000.0, 1000.0, 0.0), 10.0);

        for mesh in [sphere, heart, knot] {
            registry.register_sync_target(mesh);
        }
        Self { sphere, heart, knot }
    }

    #[must_use]
    pub fn meshes(&self) -> [MeshKey; 3] {
        [self.sphere, self.heart, self.knot]
    }
}

fn place(
    scene: &mut Scene,
    parent: NodeKey,
    name: &str,
    geometry: Geometry,
    material: MaterialKey,
    position: Vec3,
    scale: f32,
) -> MeshKey {
    let mesh = scene.meshes.insert(Mesh::new(name, Arc::new(geometry), material));
    let mut node = Node::new(name);
    node.mesh = Some(mesh);
    node.transform.position = position;
    node.transform.scale = Vec3::splat(scale);
    scene.add_to_parent(node, parent);
    mesh
}
