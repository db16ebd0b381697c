use std::sync::Arc;

use couture_core::MaterialKey;
use couture_resources::Geometry;

/// What a mesh node is for; the view pass uses this to find its own
/// overlays among a model's nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshRole {
    /// Part of the loaded model or a sample shape.
    #[default]
    Surface,
    /// Edge lines attached under a surface node.
    WireframeOverlay,
    /// Measurement guide tube.
    Guide,
    /// Ground disc under the model.
    Ground,
}

/// Geometry plus exactly one material reference.
///
/// Geometry is shared (`Arc`) so overlays and reloads never copy vertex
/// data.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub material: MaterialKey,
    pub role: MeshRole,
    pub visible: bool,
    pub render_order: i32,
}

impl Mesh {
    #[must_use]
    pub fn new(name: &str, geometry: Arc<Geometry>, material: MaterialKey) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            material,
            role: MeshRole::Surface,
            visible: true,
            render_order: 0,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: MeshRole) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn with_render_order(mut self, order: i32) -> Self {
        self.render_order = order;
        self
    }
}
