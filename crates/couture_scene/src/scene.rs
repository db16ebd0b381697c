use std::sync::atomic::{AtomicU32, Ordering};

use couture_core::{LightKey, MaterialKey, MeshKey, NodeKey};
use couture_resources::{BoundingBox, Material};
use glam::{Affine3A, Vec3};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::background::BackgroundMode;
use crate::camera::Camera;
use crate::light::Light;
use crate::mesh::{Mesh, MeshRole};
use crate::node::Node;

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Scene graph plus the component pools it references.
///
/// Materials live in the scene rather than on meshes: two meshes share a
/// material exactly when they hold the same [`MaterialKey`], which is how
/// broadcast updates become visible to every target at once.
pub struct Scene {
    pub id: u32,

    pub nodes: SlotMap<NodeKey, Node>,
    pub root_nodes: Vec<NodeKey>,

    // ==== Component pools ====
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub materials: SlotMap<MaterialKey, Material>,
    pub lights: SlotMap<LightKey, Light>,

    pub camera: Camera,
    pub camera_node: NodeKey,

    pub background: BackgroundMode,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let camera_node = nodes.insert(Node::new("camera"));
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            nodes,
            root_nodes: vec![camera_node],
            meshes: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            camera: Camera::default(),
            camera_node,
            background: BackgroundMode::default(),
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Adds a node at the root.
    pub fn add_node(&mut self, node: Node) -> NodeKey {
        let key = self.nodes.insert(node);
        self.root_nodes.push(key);
        key
    }

    pub fn add_to_parent(&mut self, child: Node, parent: NodeKey) -> NodeKey {
        let key = self.nodes.insert(child);
        self.link(key, parent);
        key
    }

    /// Moves `child` under `parent`, detaching it from wherever it was.
    pub fn attach(&mut self, child: NodeKey, parent: NodeKey) {
        if child == parent {
            log::warn!("Cannot attach node to itself");
            return;
        }
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            log::error!("Node not found during attach");
            return;
        }
        self.detach(child);
        self.link(child, parent);
    }

    fn link(&mut self, child: NodeKey, parent: NodeKey) {
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        } else {
            self.root_nodes.push(child);
            return;
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    fn detach(&mut self, key: NodeKey) {
        let parent = self.nodes.get(key).and_then(Node::parent);
        if let Some(p) = parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == key)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == key) {
            self.root_nodes.remove(i);
        }
        if let Some(n) = self.nodes.get_mut(key) {
            n.parent = None;
        }
    }

    /// Removes a node, its whole subtree and their mesh/light components.
    ///
    /// Materials are not touched; see
    /// [`prune_unreferenced_materials`](Self::prune_unreferenced_materials).
    pub fn remove_node(&mut self, key: NodeKey) {
        if key == self.camera_node || !self.nodes.contains_key(key) {
            return;
        }
        self.detach(key);

        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            let Some(node) = self.nodes.remove(k) else {
                continue;
            };
            if let Some(mesh) = node.mesh {
                self.meshes.remove(mesh);
            }
            if let Some(light) = node.light {
                self.lights.remove(light);
            }
            stack.extend(node.children.iter().copied());
        }
    }

    #[must_use]
    pub fn get_node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn get_node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    /// `root` and every node below it, parents before children.
    #[must_use]
    pub fn descendants(&self, root: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(k) = stack.pop() {
            let Some(node) = self.nodes.get(k) else {
                continue;
            };
            out.push(k);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn add_mesh(&mut self, mesh: Mesh) -> NodeKey {
        let mut node = Node::new(&mesh.name);
        node.mesh = Some(self.meshes.insert(mesh));
        self.add_node(node)
    }

    pub fn add_mesh_to_parent(&mut self, mesh: Mesh, parent: NodeKey) -> NodeKey {
        let mut node = Node::new(&mesh.name);
        node.mesh = Some(self.meshes.insert(mesh));
        self.add_to_parent(node, parent)
    }

    pub fn add_light_to_parent(&mut self, light: Light, parent: NodeKey) -> NodeKey {
        let mut node = Node::new("light");
        node.light = Some(self.lights.insert(light));
        self.add_to_parent(node, parent)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialKey {
        self.materials.insert(material)
    }

    #[must_use]
    pub fn material(&self, key: MaterialKey) -> Option<&Material> {
        self.materials.get(key)
    }

    pub fn material_mut(&mut self, key: MaterialKey) -> Option<&mut Material> {
        self.materials.get_mut(key)
    }

    /// Material currently bound to a mesh.
    #[must_use]
    pub fn mesh_material(&self, mesh: MeshKey) -> Option<&Material> {
        let key = self.meshes.get(mesh)?.material;
        self.materials.get(key)
    }

    /// Binds one material to every listed mesh.
    ///
    /// All bindings change within this call; a mesh that no longer exists is
    /// skipped. Returns how many meshes were rebound.
    pub fn assign_material(&mut self, material: MaterialKey, targets: &[MeshKey]) -> usize {
        let mut count = 0;
        for &target in targets {
            if let Some(mesh) = self.meshes.get_mut(target) {
                mesh.material = material;
                count += 1;
            }
        }
        count
    }

    /// Drops materials no mesh refers to any more.
    pub fn prune_unreferenced_materials(&mut self) -> usize {
        let used: FxHashSet<MaterialKey> = self.meshes.values().map(|m| m.material).collect();
        let before = self.materials.len();
        self.materials.retain(|key, _| used.contains(&key));
        let removed = before - self.materials.len();
        if removed > 0 {
            log::debug!("Pruned {removed} unreferenced materials");
        }
        removed
    }

    /// Node owning the given mesh component.
    #[must_use]
    pub fn mesh_node(&self, mesh: MeshKey) -> Option<NodeKey> {
        self.nodes
            .iter()
            .find_map(|(k, n)| (n.mesh == Some(mesh)).then_some(k))
    }

    /// Meshes with `role` in the subtree rooted at `root`.
    #[must_use]
    pub fn meshes_in_subtree(&self, root: NodeKey, role: MeshRole) -> Vec<MeshKey> {
        self.descendants(root)
            .into_iter()
            .filter_map(|k| self.nodes.get(k)?.mesh)
            .filter(|m| self.meshes.get(*m).is_some_and(|mesh| mesh.role == role))
            .collect()
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    /// Propagates world matrices down the hierarchy and refreshes the
    /// camera's view matrix. Called once per frame before drawing.
    pub fn update_matrix_world(&mut self) {
        let mut stack: Vec<(NodeKey, Affine3A, bool)> = self
            .root_nodes
            .iter()
            .map(|&k| (k, Affine3A::IDENTITY, false))
            .collect();

        while let Some((key, parent_world, parent_changed)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(key) else {
                continue;
            };
            let local_changed = node.transform.update_local_matrix();
            let changed = local_changed || parent_changed;
            if changed {
                let world = parent_world * *node.transform.local_matrix();
                node.transform.set_world_matrix(world);
            }
            let world = *node.transform.world_matrix();
            stack.extend(node.children.iter().map(|&c| (c, world, changed)));
        }

        if let Some(node) = self.nodes.get(self.camera_node) {
            let world = *node.transform.world_matrix();
            self.camera.update_view(&world);
        }
    }

    /// World-space bounds of every mesh in a subtree.
    ///
    /// Uses the world matrices from the last
    /// [`update_matrix_world`](Self::update_matrix_world).
    #[must_use]
    pub fn subtree_bounding_box(&self, root: NodeKey) -> Option<BoundingBox> {
        self.descendants(root)
            .into_iter()
            .filter_map(|k| {
                let node = self.nodes.get(k)?;
                let mesh = self.meshes.get(node.mesh?)?;
                let local = mesh.geometry.bounding_box()?;
                Some(local.transform(node.transform.world_matrix()))
            })
            .reduce(|a, b| a.union(&b))
    }

    /// World position of a node's origin.
    #[must_use]
    pub fn world_position(&self, key: NodeKey) -> Option<Vec3> {
        Some(self.nodes.get(key)?.transform.world_matrix().translation.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use couture_core::Color;
    use couture_resources::primitives::create_box;

    use super::*;

    fn box_mesh(scene: &mut Scene, name: &str) -> Mesh {
        let material = scene.add_material(Material::new_physical(Color::WHITE));
        Mesh::new(name, Arc::new(create_box(2.0, 2.0, 2.0)), material)
    }

    #[test]
    fn remove_node_drops_subtree_and_components() {
        let mut scene = Scene::new();
        let group = scene.add_node(Node::new("group"));
        let mesh = box_mesh(&mut scene, "a");
        let child = scene.add_mesh_to_parent(mesh, group);
        let mesh = box_mesh(&mut scene, "b");
        scene.add_mesh_to_parent(mesh, child);

        assert_eq!(scene.meshes.len(), 2);
        scene.remove_node(group);
        assert!(scene.meshes.is_empty());
        assert_eq!(scene.root_nodes, vec![scene.camera_node]);
        assert_eq!(scene.prune_unreferenced_materials(), 2);
    }

    #[test]
    fn world_matrices_follow_parents() {
        let mut scene = Scene::new();
        let mut parent = Node::new("stage");
        parent.transform.position = Vec3::new(0.0, -58.0, 0.0);
        parent.transform.scale = Vec3::splat(0.5);
        let parent = scene.add_node(parent);
        let mut child = Node::new("child");
        child.transform.position = Vec3::new(10.0, 0.0, 0.0);
        let child = scene.add_to_parent(child, parent);

        scene.update_matrix_world();
        let p = scene.world_position(child).unwrap();
        assert!(p.distance(Vec3::new(5.0, -58.0, 0.0)) < 1e-5);

        scene.get_node_mut(parent).unwrap().transform.position.y = 0.0;
        scene.update_matrix_world();
        let p = scene.world_position(child).unwrap();
        assert!(p.distance(Vec3::new(5.0, 0.0, 0.0)) < 1e-5);
    }

    #[test]
    fn attach_moves_between_parents() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new("a"));
        let b = scene.add_node(Node::new("b"));
        let c = scene.add_to_parent(Node::new("c"), a);
        scene.attach(c, b);
        assert!(scene.get_node(a).unwrap().children().is_empty());
        assert_eq!(scene.get_node(b).unwrap().children(), &[c]);
        assert_eq!(scene.get_node(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn subtree_bounds_use_world_space() {
        let mut scene = Scene::new();
        let mut group = Node::new("group");
        group.transform.scale = Vec3::splat(10.0);
        let group = scene.add_node(group);
        let mesh = box_mesh(&mut scene, "a");
        scene.add_mesh_to_parent(mesh, group);
        scene.update_matrix_world();

        let bounds = scene.subtree_bounding_box(group).unwrap();
        assert!((bounds.max.x - 10.0).abs() < 1e-4);
        assert!((bounds.min.y + 10.0).abs() < 1e-4);
    }
}
